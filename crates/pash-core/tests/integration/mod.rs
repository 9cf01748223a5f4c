mod cipher_roundtrip;
mod password_pipeline;
