use songsig::io::{dump, signature::DATA_URI_PREFIX, wav};
use songsig::{
    Fingerprint, RecognitionPayload, SignatureGenerator, SignatureParams,
    DEFAULT_EXCERPT_SECONDS,
};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        print_usage();
        std::process::exit(1);
    }

    let command = args[1].as_str();
    let input = &args[2];

    // Parse remaining arguments
    let mut seconds = DEFAULT_EXCERPT_SECONDS;
    let mut json = false;
    let mut config_path: Option<String> = None;
    let mut max_seconds: Option<f64> = None;
    let mut max_peaks: Option<usize> = None;
    let mut timestamp_ms: u64 = 0;
    let mut verbose = false;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--seconds" | "-s" => {
                i += 1;
                seconds = parse_f64(&args, i, "seconds");
            }
            "--json" => json = true,
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("ERROR: --config requires a value");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            "--max-seconds" => {
                i += 1;
                max_seconds = Some(parse_f64(&args, i, "max-seconds"));
            }
            "--max-peaks" => {
                i += 1;
                max_peaks = Some(parse_usize(&args, i, "max-peaks"));
            }
            "--timestamp" => {
                i += 1;
                timestamp_ms = parse_usize(&args, i, "timestamp") as u64;
            }
            "--verbose" | "-v" => verbose = true,
            other => {
                eprintln!("WARNING: Ignoring unknown argument '{}'", other);
            }
        }
        i += 1;
    }

    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match command {
        "fingerprint" => {
            let signature = sign_file(input, seconds);
            if json {
                println!("{}", or_exit(dump::to_json_pretty(&signature), "JSON dump failed"));
            } else {
                println!("{}", or_exit(signature.encode_to_uri(), "Encoding failed"));
            }
        }
        "stream" => {
            let mut params = match &config_path {
                Some(path) => or_exit(SignatureParams::from_json_file(path), "Invalid config"),
                None => SignatureParams::default(),
            };
            if let Some(s) = max_seconds {
                params = params.with_max_time_seconds(s);
            }
            if let Some(n) = max_peaks {
                params = params.with_max_peaks(n);
            }
            let rate = params.sample_rate;
            let mut generator = or_exit(SignatureGenerator::new(params), "Invalid parameters");

            let buffer = or_exit(wav::read_wav_file(input), "Failed to read input");
            eprintln!(
                "Input: {} frames, {} Hz, {} channel(s), {:.2}s",
                buffer.num_frames(),
                buffer.sample_rate,
                buffer.channels,
                buffer.duration_secs()
            );
            generator.feed(&buffer.to_signature_pcm(rate));

            let mut count = 0;
            for signature in generator.signatures() {
                if verbose {
                    eprintln!(
                        "Signature {}: {:.2}s, {} peaks",
                        count,
                        signature.duration_secs(),
                        signature.peak_count()
                    );
                }
                println!("{}", or_exit(signature.encode_to_uri(), "Encoding failed"));
                count += 1;
            }
            eprintln!("{} signature(s)", count);
        }
        "decode" => {
            let signature = or_exit(decode_input(input), "Decoding failed");
            println!("{}", or_exit(dump::to_json_pretty(&signature), "JSON dump failed"));
        }
        "payload" => {
            let signature = sign_file(input, seconds);
            let payload = or_exit(
                RecognitionPayload::new(&signature, timestamp_ms),
                "Encoding failed",
            );
            println!("{}", or_exit(payload.to_json_pretty(), "JSON encoding failed"));
        }
        other => {
            eprintln!("ERROR: Unknown command '{}'", other);
            print_usage();
            std::process::exit(1);
        }
    }
}

/// Signs the middle `seconds` of a WAV file.
fn sign_file(path: &str, seconds: f64) -> Fingerprint {
    let signature = or_exit(
        songsig::signature_from_wav_file(path, seconds),
        "Failed to sign input",
    );
    eprintln!(
        "Signature: {:.2}s, {} peaks",
        signature.duration_secs(),
        signature.peak_count()
    );
    signature
}

/// Decodes a data URI given directly, or a file holding a URI or a raw
/// binary signature.
fn decode_input(input: &str) -> Result<Fingerprint, songsig::SignatureError> {
    if input.starts_with(DATA_URI_PREFIX) {
        return Fingerprint::decode_from_uri(input);
    }
    let data = std::fs::read(input)
        .map_err(|e| songsig::SignatureError::IoError(format!("{}: {}", input, e)))?;
    match std::str::from_utf8(&data) {
        Ok(text) if text.trim_start().starts_with(DATA_URI_PREFIX) => {
            Fingerprint::decode_from_uri(text)
        }
        _ => Fingerprint::decode_from_binary(&data),
    }
}

fn or_exit<T>(result: Result<T, songsig::SignatureError>, context: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            eprintln!("ERROR: {}: {}", context, e);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: songsig <command> <input> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  fingerprint <file.wav>   Sign the middle of a recording, print its URI");
    eprintln!("  stream <file.wav>        Cut the whole recording into signatures, one URI per line");
    eprintln!("  decode <uri | file>      Print a signature (URI, URI file or binary) as JSON");
    eprintln!("  payload <file.wav>       Print the recognition request body for a recording");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --seconds <f>, -s      Excerpt length for fingerprint/payload (default: 12)");
    eprintln!("  --json                 Print fingerprint as JSON instead of a URI");
    eprintln!("  --config <file>, -c    JSON generator parameters for stream");
    eprintln!("  --max-seconds <f>      Signature duration threshold for stream (default: 3.1)");
    eprintln!("  --max-peaks <N>        Signature peak threshold for stream (default: 255)");
    eprintln!("  --timestamp <ms>       Unix time in milliseconds for payload (default: 0)");
    eprintln!("  --verbose, -v          Debug logging (or set RUST_LOG)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  songsig fingerprint song.wav");
    eprintln!("  songsig fingerprint song.wav --seconds 8 --json");
    eprintln!("  songsig stream live.wav --max-seconds 5");
    eprintln!("  songsig decode 'data:audio/vnd.shazam.sig;base64,gCX+yn...'");
    eprintln!("  songsig payload song.wav --timestamp 1700000000000");
}

fn parse_f64(args: &[String], idx: usize, name: &str) -> f64 {
    if idx >= args.len() {
        eprintln!("ERROR: --{} requires a value", name);
        std::process::exit(1);
    }
    match args[idx].parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("ERROR: Invalid {}: {}", name, args[idx]);
            std::process::exit(1);
        }
    }
}

fn parse_usize(args: &[String], idx: usize, name: &str) -> usize {
    if idx >= args.len() {
        eprintln!("ERROR: --{} requires a value", name);
        std::process::exit(1);
    }
    match args[idx].parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("ERROR: Invalid {}: {}", name, args[idx]);
            std::process::exit(1);
        }
    }
}
