pub mod streaming_transcriber;
