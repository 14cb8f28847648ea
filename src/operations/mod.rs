pub mod admin;
pub mod deposit;
pub mod emergency;
pub mod harvest;
pub mod view;
pub mod withdraw;
