
mod ask_tell;
mod properties;
