mod audio;
mod config;
mod download;
mod error;
mod history;
mod playlist;
mod runtime;
mod sequence;
mod source;

fn main() {
    if let Err(e) = runtime::run() {
        eprintln!("treeplay: {e}");
        std::process::exit(1);
    }
}
