//! Output generation for extracted articles.
//!
//! # Submodules
//!
//! - [`text`]: Writes one `<event_id>.txt` file per article
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── ID812345.txt
//! ├── ID812346.txt
//! └── ...
//! ```

pub mod text;
