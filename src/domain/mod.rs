pub mod cart;
pub mod errors;
pub mod order;
pub mod order_number;
pub mod ports;
pub mod product;
