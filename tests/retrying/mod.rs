mod behavior;
mod parity;
