pub mod okq8;

pub use okq8::{Okq8Parser, classify, type_and_amount};
