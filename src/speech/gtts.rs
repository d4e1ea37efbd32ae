use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use directories::BaseDirs;
use log::debug;
use sha2::{Digest, Sha256};

use super::Speech;
use crate::error::SpeechError;

const TTS_URL: &str = "https://translate.google.com/translate_tts";
const WARMUP_TEXT: &str = "Hallo.";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Longest text the TTS endpoint accepts in one request.
const MAX_CHUNK_CHARS: usize = 100;

const PLAYER: &str = "ffplay";
const FFMPEG: &str = "ffmpeg";
const APLAY: &str = "aplay";
const POWERSHELL: [&str; 2] = ["powershell", "powershell.exe"];
// WAV parameters accepted by `aplay`.
const WAV_CODEC: &str = "pcm_s16le";
const WAV_CHANNELS: &str = "1";
const WAV_RATE_HZ: &str = "22050";

/// Google text-to-speech with an on-disk MP3 cache, played through
/// `ffplay` (or `ffmpeg` + `aplay` on Linux, PowerShell on Windows).
///
/// The cache is keyed by language, speed and text, so repeated
/// sentences are only downloaded once.
pub struct Gtts {
    language: String,
    slow: bool,
    cache_dir: Option<PathBuf>,
    client: reqwest::blocking::Client,
    ready: AtomicBool,
}

impl Gtts {
    /// Speaker for `language` (e.g. “de”, “en”).
    pub fn new(language: &str) -> Result<Self, SpeechError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;
        Ok(Gtts { language: language.to_string(), slow: false,
                  cache_dir: None, client, ready: AtomicBool::new(false) })
    }

    /// Speak slowly.
    pub fn slow(mut self, slow: bool) -> Self {
        self.slow = slow;
        self
    }

    /// Store the MP3 files in `dir` instead of the user cache.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    fn cache_root(&self) -> PathBuf {
        if let Some(d) = &self.cache_dir { return d.clone() }
        BaseDirs::new().map(|d| d.cache_dir().to_path_buf())
            .unwrap_or_else(env::temp_dir)
            .join("color_sentence").join("gtts-cache").join(&self.language)
    }

    /// Cache file of `text`.
    pub fn cached_mp3(&self, text: &str) -> PathBuf {
        let key = format!("{}|{}|{}", self.language, self.slow, text);
        let digest = hex::encode(Sha256::digest(key.as_bytes()));
        let speed = if self.slow { "slow" } else { "fast" };
        self.cache_root().join(format!("{speed}_{digest}.mp3"))
    }

    fn fetch(&self, chunk: &str) -> Result<Vec<u8>, SpeechError> {
        let speed = if self.slow { "0.24" } else { "1" };
        self.client.get(TTS_URL)
            .query(&[("ie", "UTF-8"), ("client", "tw-ob"),
                     ("tl", self.language.as_str()), ("ttsspeed", speed),
                     ("q", chunk)])
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())
            .map(|b| b.to_vec())
            .map_err(|e| SpeechError::Synthesis(e.to_string()))
    }

    /// Download the MP3 of `text` to `target`, through a temporary
    /// file in the same directory so that `target` is never partial.
    /// Long texts are fetched in chunks whose MP3 streams are
    /// concatenated.
    fn synthesize_to(&self, target: &Path, text: &str) -> Result<(), SpeechError> {
        let text = prepare_text(text);
        let dir = target.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;
        let mut tmp = tempfile::Builder::new()
            .prefix("gtts_").suffix(".mp3").tempfile_in(dir)?;
        for chunk in split_chunks(text, MAX_CHUNK_CHARS) {
            tmp.write_all(&self.fetch(chunk)?)?;
        }
        tmp.persist(target).map_err(|e| SpeechError::Io(e.error))?;
        debug!("cached speech for “{text}” in {target:?}");
        Ok(())
    }

    fn ensure_cached(&self, text: &str) -> Result<PathBuf, SpeechError> {
        let mp3 = self.cached_mp3(text);
        if !mp3.exists() { self.synthesize_to(&mp3, text)? }
        Ok(mp3)
    }
}

impl Speech for Gtts {
    fn warmup(&self) -> Result<(), SpeechError> {
        if self.ready.load(Ordering::SeqCst) { return Ok(()) }
        fs::create_dir_all(self.cache_root())?;
        let sample = self.ensure_cached(WARMUP_TEXT)?;
        play(&sample)?;
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        self.warmup()?;
        play(&self.ensure_cached(text)?)
    }
}

/// The synthesis service rejects texts without any alphanumeric
/// character.
fn prepare_text(text: &str) -> &str {
    let t = text.trim();
    if t.chars().any(char::is_alphanumeric) { t } else { WARMUP_TEXT }
}

/// Split `text` into pieces of at most `max` characters, at white
/// space when possible.  Words longer than `max` are cut.
fn split_chunks(text: &str, max: usize) -> Vec<&str> {
    let max = max.max(1);
    let mut chunks = vec![];
    let mut rest = text.trim();
    while !rest.is_empty() {
        let (end, next) = match rest.char_indices().nth(max) {
            None => { chunks.push(rest); break }
            Some(ic) => ic,
        };
        // A space right after the first `max` characters is a valid cut.
        let cut = rest[..end + next.len_utf8()].rfind(char::is_whitespace)
            .filter(|&i| i > 0).unwrap_or(end);
        chunks.push(rest[..cut].trim_end());
        rest = rest[cut..].trim_start();
    }
    chunks
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool { path.is_file() }

/// Extensions tried after the bare name: `PATHEXT` on Windows.
fn executable_extensions() -> Vec<String> {
    if !cfg!(windows) { return vec![] }
    let exts = env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".into());
    exts.split(';').filter(|e| !e.is_empty())
        .map(|e| e.trim_start_matches('.').to_string()).collect()
}

/// Full path of the executable `name` found on `PATH`.
fn which(name: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    let exts = executable_extensions();
    env::split_paths(&path).find_map(|dir| {
        let p = dir.join(name);
        if is_executable(&p) { return Some(p) }
        exts.iter().map(|e| p.with_extension(e)).find(|q| is_executable(q))
    })
}

fn run_checked(program: &Path, args: &[&OsStr]) -> Result<(), SpeechError> {
    let status = Command::new(program).args(args).status().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SpeechError::Unavailable(format!("executable not found: {program:?}"))
        } else { SpeechError::Io(e) }
    })?;
    if status.success() { Ok(()) }
    else {
        Err(SpeechError::Command { program: program.display().to_string(),
                                   status })
    }
}

fn play_ffplay(ffplay: &Path, mp3: &Path) -> Result<(), SpeechError> {
    let args = ["-nodisp", "-autoexit", "-loglevel", "quiet"].map(OsStr::new);
    let mut args = args.to_vec();
    args.push(mp3.as_os_str());
    run_checked(ffplay, &args)
}

fn play(mp3: &Path) -> Result<(), SpeechError> {
    if let Some(ffplay) = which(PLAYER) { return play_ffplay(&ffplay, mp3) }
    if cfg!(target_os = "linux") { play_aplay(mp3) }
    else if cfg!(windows) { play_powershell(mp3) }
    else { Err(SpeechError::UnsupportedPlatform(env::consts::OS.to_string())) }
}

fn play_aplay(mp3: &Path) -> Result<(), SpeechError> {
    let (Some(ffmpeg), Some(aplay)) = (which(FFMPEG), which(APLAY)) else {
        return Err(SpeechError::Unavailable(
            "install “ffplay” or both “ffmpeg” and “aplay”".to_string()))
    };
    let wav = tempfile::Builder::new().prefix("gtts_").suffix(".wav").tempfile()?;
    let convert = ["-y", "-loglevel", "error", "-i"].map(OsStr::new).into_iter()
        .chain([mp3.as_os_str()])
        .chain(["-acodec", WAV_CODEC, "-ac", WAV_CHANNELS, "-ar", WAV_RATE_HZ]
               .map(OsStr::new))
        .chain([wav.path().as_os_str()])
        .collect::<Vec<_>>();
    run_checked(&ffmpeg, &convert)?;
    run_checked(&aplay, &[OsStr::new("-q"), wav.path().as_os_str()])
    // `wav` is removed on drop.
}

fn play_powershell(mp3: &Path) -> Result<(), SpeechError> {
    let Some(ps) = POWERSHELL.iter().find_map(|p| which(p)) else {
        return Err(SpeechError::Unavailable(
            "PowerShell not found on PATH".to_string()))
    };
    let path = fs::canonicalize(mp3)?;
    let uri = format!("file:///{}", path.display().to_string()
                      .trim_start_matches(r"\\?\").replace('\\', "/"));
    let script = format!(r#"
Add-Type -AssemblyName PresentationCore
$player = New-Object System.Windows.Media.MediaPlayer
$player.Open([Uri] '{uri}')
$player.Volume = 1.0
$player.Play()
while (-not $player.NaturalDuration.HasTimeSpan) {{ Start-Sleep -Milliseconds 50 }}
while ($player.Position -lt $player.NaturalDuration.TimeSpan) {{ Start-Sleep -Milliseconds 100 }}
"#);
    run_checked(&ps, &[OsStr::new("-NoProfile"), OsStr::new("-Command"),
                       OsStr::new(&script)])
}
