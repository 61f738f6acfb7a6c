use std::{
    collections::{HashMap, VecDeque},
    path::{Path, PathBuf},
};

use crate::{
    foundation::error::{PlayerError, PlayerResult},
    media::{
        frame::VisualFrame,
        source::{VideoInfo, VideoSource},
    },
};

/// Sample rate background audio is decoded to.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Decoded interleaved floating-point PCM.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved_f32.len() / usize::from(self.channels)
    }
}

/// Whether both `ffmpeg` and `ffprobe` can be spawned.
pub fn ffmpeg_tools_available() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        std::process::Command::new(tool)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

/// Probe source video metadata through `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> PlayerResult<VideoInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let url = source_path.display().to_string();
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| PlayerError::resource_load(&url, format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(PlayerError::resource_load(
            &url,
            format!("ffprobe failed: {}", String::from_utf8_lossy(&out.stderr).trim()),
        ));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| PlayerError::resource_load(&url, format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| PlayerError::resource_load(&url, "no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| PlayerError::resource_load(&url, "missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| PlayerError::resource_load(&url, "missing video height from ffprobe"))?;
    let fps = video_stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_ff_ratio)
        .map(|(n, d)| f64::from(n) / f64::from(d))
        .unwrap_or(30.0);
    let duration_secs = video_stream
        .duration
        .as_deref()
        .or_else(|| parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|s| s.trim().parse::<f64>().ok())
        .ok_or_else(|| PlayerError::resource_load(&url, "missing duration from ffprobe"))?;

    Ok(VideoInfo {
        width,
        height,
        duration_secs,
        fps,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Probe source video metadata through `ffprobe`.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn probe_video(source_path: &Path) -> PlayerResult<VideoInfo> {
    Err(PlayerError::resource_load(
        source_path.display().to_string(),
        "video entries require the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
fn decode_video_frames_rgba8(
    source_path: &Path,
    info: &VideoInfo,
    start_time_sec: f64,
    frame_count: u32,
) -> PlayerResult<Vec<Vec<u8>>> {
    if frame_count == 0 {
        return Ok(Vec::new());
    }

    let url = source_path.display().to_string();
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{start_time_sec:.9}")])
        .arg("-i")
        .arg(source_path)
        .args([
            "-frames:v",
            &frame_count.to_string(),
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| {
            PlayerError::resource_load(&url, format!("failed to run ffmpeg for video decode: {e}"))
        })?;

    if !out.status.success() {
        return Err(PlayerError::resource_load(
            &url,
            format!(
                "ffmpeg video decode failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    let expected_len = info.width as usize * info.height as usize * 4;
    if expected_len == 0 {
        return Err(PlayerError::resource_load(
            &url,
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if !out.stdout.len().is_multiple_of(expected_len) {
        return Err(PlayerError::resource_load(
            &url,
            format!(
                "decoded video batch has invalid size: got {} bytes, expected multiples of {expected_len}",
                out.stdout.len()
            ),
        ));
    }

    let available = (out.stdout.len() / expected_len).min(frame_count as usize);
    let mut frames = Vec::with_capacity(available);
    for idx in 0..available {
        let off = idx * expected_len;
        frames.push(out.stdout[off..off + expected_len].to_vec());
    }
    Ok(frames)
}

#[cfg(not(feature = "media-ffmpeg"))]
fn decode_video_frames_rgba8(
    source_path: &Path,
    _info: &VideoInfo,
    _start_time_sec: f64,
    _frame_count: u32,
) -> PlayerResult<Vec<Vec<u8>>> {
    Err(PlayerError::resource_load(
        source_path.display().to_string(),
        "video entries require the 'media-ffmpeg' feature",
    ))
}

/// Video stream decoded on demand through `ffmpeg`, with a small LRU of prefetched frames.
pub struct FfmpegVideo {
    path: PathBuf,
    info: VideoInfo,
    frame_cache: HashMap<u64, VisualFrame>,
    lru: VecDeque<u64>,
    capacity: usize,
    prefetch_frames: u32,
}

impl FfmpegVideo {
    /// Probe `path`; frames are decoded lazily on the first [`VideoSource::frame_at`].
    pub fn open(path: &Path) -> PlayerResult<Self> {
        let info = probe_video(path)?;
        info.validate()
            .map_err(|e| PlayerError::resource_load(path.display().to_string(), e))?;
        Ok(Self {
            path: path.to_path_buf(),
            info,
            frame_cache: HashMap::new(),
            lru: VecDeque::new(),
            capacity: 64,
            prefetch_frames: 12,
        })
    }

    fn prefetch_from(&mut self, key: u64) -> PlayerResult<()> {
        let bucket = key - key % u64::from(self.prefetch_frames);
        let fps = if self.info.fps > 0.0 { self.info.fps } else { 30.0 };
        let start_time_s = bucket as f64 / fps;
        let frames =
            decode_video_frames_rgba8(&self.path, &self.info, start_time_s, self.prefetch_frames)?;

        for (offset, mut rgba) in frames.into_iter().enumerate() {
            let k = bucket + offset as u64;
            if self.frame_cache.contains_key(&k) {
                self.touch(k);
                continue;
            }
            crate::media::decode::premultiply_rgba8_in_place(&mut rgba);
            let frame = VisualFrame::new(self.info.width, self.info.height, rgba)?;
            self.insert_frame(k, frame);
        }
        Ok(())
    }

    fn insert_frame(&mut self, key: u64, frame: VisualFrame) {
        self.frame_cache.insert(key, frame);
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.frame_cache.remove(&old);
            }
        }
    }

    fn touch(&mut self, key: u64) {
        if let Some(pos) = self.lru.iter().position(|x| *x == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

impl VideoSource for FfmpegVideo {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn frame_at(&mut self, time_secs: f64) -> PlayerResult<Option<VisualFrame>> {
        let key = self.info.frame_key(time_secs);
        if !self.frame_cache.contains_key(&key) {
            self.prefetch_from(key)?;
        }
        // Past the last decodable frame (ffmpeg rounding near the end) the latest earlier one holds.
        let Some(hit) = nearest_at_or_below(&self.frame_cache, key) else {
            return Ok(None);
        };
        self.touch(hit);
        Ok(self.frame_cache.get(&hit).cloned())
    }
}

/// The cached frame key closest to `key` without going past it.
fn nearest_at_or_below<V>(cache: &HashMap<u64, V>, key: u64) -> Option<u64> {
    if cache.contains_key(&key) {
        return Some(key);
    }
    cache.keys().copied().filter(|k| *k <= key).max()
}

#[cfg(feature = "media-ffmpeg")]
/// Decode any ffmpeg-readable audio file into stereo `f32` PCM.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> PlayerResult<AudioPcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| PlayerError::audio_load(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(PlayerError::audio_load(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(PlayerError::audio_load(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let mut pcm = Vec::<f32>::with_capacity(out.stdout.len() / 4);
    for chunk in out.stdout.chunks_exact(4) {
        pcm.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: pcm,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Decode any ffmpeg-readable audio file into stereo `f32` PCM.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn decode_audio_f32_stereo(_path: &Path, _sample_rate: u32) -> PlayerResult<AudioPcm> {
    Err(PlayerError::audio_load(
        "background audio requires the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if a == 0 || b == 0 {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
#[path = "../../tests/unit/media/ffmpeg.rs"]
mod tests;
