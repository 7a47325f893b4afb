//! Domain models for the Farm Village server.

pub mod account;
pub mod cart;
pub mod order;
pub mod product;

pub use account::{Account, CurrentAccount};
pub use cart::{CartItem, CartLine};
pub use order::{Order, OrderLine};
pub use product::{NewProduct, Product};
