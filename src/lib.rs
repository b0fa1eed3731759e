// src/lib.rs
//
// Backend-for-frontend of the VoteChain voting dApp: validates poll drafts
// and date windows locally, then drives the smart contract through the
// gateway seam.

pub mod dates;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod wallet;
