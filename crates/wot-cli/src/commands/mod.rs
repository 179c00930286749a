pub mod doc;
pub mod graph;
pub mod identity;
pub mod init;
pub mod profile;
pub mod profiles;
pub mod revoke;
pub mod scan;
pub mod trust;
