pub mod exchangerate_host;
pub mod frankfurter;
pub mod nbu;
pub mod retry;
pub mod router;
