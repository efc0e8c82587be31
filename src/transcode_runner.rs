//! Entrypoint to convert one video file with ffmpeg. Exits with status 1
//! when the encoder cannot be started or reports a failure.

use maskserve::config::Settings;
use maskserve::transcode::Transcoder;
use maskserve::util::init_tracing;
use std::{env, process};

const USAGE: &str = "usage: ./transcode [<input> <output>]";

#[tokio::main]
async fn main() {
    init_tracing();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            println!("An error occurred: {e:#}");
            process::exit(1);
        }
    };

    let args: Vec<String> = env::args().skip(1).collect();
    let transcoder = match args.as_slice() {
        [] => Transcoder::from(&settings.transcode),
        [input, output] => Transcoder::new(settings.transcode.ffmpeg.clone(), input, output),
        _ => {
            println!("{USAGE}");
            process::exit(2);
        }
    };

    match transcoder.run().await {
        Ok(()) => println!(
            "Conversion successful! {} has been converted to {}",
            transcoder.input().display(),
            transcoder.output().display()
        ),
        Err(e) => {
            println!("An error occurred: {e}");
            process::exit(1);
        }
    }
}
