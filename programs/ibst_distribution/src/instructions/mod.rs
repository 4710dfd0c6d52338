/**
 * Instructions for IBST Distribution
 * 
 * Made by LabsX402 for Solana
 * https://x.com/LabsX402
 */

pub mod initialize;
pub mod admin;
pub mod set_allocation;
pub mod claim;
pub mod contribution;

pub use initialize::*;
pub use admin::*;
pub use set_allocation::*;
pub use claim::*;
pub use contribution::*;
