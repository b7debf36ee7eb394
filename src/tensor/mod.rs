mod desc;
pub use desc::TensorDesc;
