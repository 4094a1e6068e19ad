pub mod price_check_sync;
