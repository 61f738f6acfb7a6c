pub mod decode;
pub mod ffmpeg;
pub mod frame;
pub mod fs;
pub mod memory;
pub mod source;
