pub mod event;
pub mod ingress;
pub mod reducer;
