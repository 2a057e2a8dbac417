pub mod basket;
pub mod curves;
pub mod fee;
