pub mod openpgp_backend;
