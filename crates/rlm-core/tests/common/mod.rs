pub mod rules_server;
