/**
 * State Accounts for IBST Distribution
 * 
 * Made by LabsX402 for Solana
 * https://x.com/LabsX402
 */

pub mod distribution;
pub mod allocation;

pub use distribution::*;
pub use allocation::*;
