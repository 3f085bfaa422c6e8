pub mod chain_result;
