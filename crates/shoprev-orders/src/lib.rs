pub mod client;
pub mod error;
pub mod pagination;
pub mod retry;
pub mod types;

pub use client::OrdersClient;
pub use error::OrdersError;
pub use pagination::next_page_info;
pub use types::{
    OrdersResponse, ShopCustomer, ShopInfo, ShopLineItem, ShopOrder, ShopRefund,
    ShopRefundLineItem, ShopResponse, ShopShippingLine, ShopTransaction,
};
