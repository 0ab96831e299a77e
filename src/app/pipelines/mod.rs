pub mod digest_pipeline;
