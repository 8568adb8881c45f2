//! chromiumoxide によるブラウザ操作
//!
//! クエリ1回につき `ChromeSession` を1つ起動し、終了時に `shutdown` する。

mod scripts;
mod session;

pub use session::ChromeSession;
