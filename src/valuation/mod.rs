pub mod altman;
pub mod dcf;
pub mod intrinsic;
