pub mod range_server;
