pub mod icon_store;
