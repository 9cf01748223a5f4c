mod masking;
mod uniformity;
mod zeroize_on_drop;
