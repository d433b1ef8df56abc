pub mod contract;
pub mod descriptor;
pub mod provider;
pub mod transaction;
pub mod utils;
pub mod value;
