//! ffmpeg subprocess wrapper implementing [`MediaTool`].
//!
//! All re-muxes use stream copy; nothing is re-encoded. Temp files do not
//! end in the container extension, so the muxer is always passed with `-f`.
//!
//! [`MediaTool`]: crate::traits::MediaTool

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Container, MediaError, MuxRequest};
use crate::tools;

/// Color tags applied on merge. Players that guess the color space from
/// missing metadata render YouTube streams with shifted colors otherwise.
const COLOR_TAGS: [&str; 6] = [
    "-color_primaries",
    "bt709",
    "-color_trc",
    "bt709",
    "-colorspace",
    "bt709",
];

/// ffmpeg wrapper
pub struct FfmpegTool {
    program: PathBuf,
    timeout: Duration,
    container: Container,
}

impl FfmpegTool {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration, container: Container) -> Self {
        Self {
            program: program.into(),
            timeout,
            container,
        }
    }

    /// Run one re-mux.
    pub async fn mux(&self, request: &MuxRequest) -> Result<(), MediaError> {
        tracing::debug!("ffmpeg {} -> {:?}", request.step(), request.output());
        tools::run(&self.program, self.build_args(request), self.timeout).await?;
        Ok(())
    }

    /// Decode the frame at `offset` to raw RGB24 bytes.
    pub async fn extract_frame(&self, path: &Path, offset: Duration) -> Result<Vec<u8>, MediaError> {
        let output = tools::run(&self.program, frame_args(path, offset), self.timeout).await?;
        if output.stdout.is_empty() {
            return Err(MediaError::EmptyFrame(offset));
        }
        Ok(output.stdout)
    }

    /// Version string, if ffmpeg is installed.
    pub async fn version(&self) -> Option<String> {
        tools::version(&self.program, "-version").await
    }

    fn build_args(&self, request: &MuxRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-y"]
            .iter()
            .map(OsString::from)
            .collect();

        match request {
            MuxRequest::Merge { video, audio, .. } => {
                push_input(&mut args, video);
                push_input(&mut args, audio);
                push_all(&mut args, &["-map", "0:v:0", "-map", "1:a:0", "-c", "copy"]);
                push_all(&mut args, &COLOR_TAGS);
            }
            MuxRequest::Tag { input, tags, .. } => {
                push_input(&mut args, input);
                push_all(&mut args, &["-map", "0", "-c", "copy"]);
                let genre = tags.genre();
                for (key, value) in [
                    ("title", tags.title.as_str()),
                    ("artist", tags.artist.as_str()),
                    ("album", tags.album.as_str()),
                    ("genre", genre.as_str()),
                ] {
                    args.push("-metadata".into());
                    args.push(format!("{}={}", key, value).into());
                }
            }
            MuxRequest::AttachCover { input, image, .. } => match self.container {
                Container::Mp4 => {
                    push_input(&mut args, input);
                    push_input(&mut args, image);
                    push_all(
                        &mut args,
                        &[
                            "-map",
                            "0",
                            "-map",
                            "1",
                            "-c",
                            "copy",
                            "-disposition:v:1",
                            "attached_pic",
                        ],
                    );
                }
                Container::Mkv => {
                    push_input(&mut args, input);
                    push_all(&mut args, &["-map", "0", "-c", "copy", "-attach"]);
                    args.push(image.as_os_str().to_owned());
                    push_all(
                        &mut args,
                        &[
                            "-metadata:s:t",
                            "mimetype=image/jpeg",
                            "-metadata:s:t",
                            "filename=cover.jpg",
                        ],
                    );
                }
            },
        }

        if self.container == Container::Mp4 {
            push_all(&mut args, &["-movflags", "+faststart"]);
        }
        push_all(&mut args, &["-f", self.container.muxer()]);
        args.push(request.output().as_os_str().to_owned());
        args
    }
}

fn frame_args(path: &Path, offset: Duration) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    push_all(&mut args, &["-hide_banner", "-loglevel", "error", "-ss"]);
    args.push(format!("{:.3}", offset.as_secs_f64()).into());
    push_input(&mut args, path);
    push_all(
        &mut args,
        &["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"],
    );
    args
}

fn push_input(args: &mut Vec<OsString>, path: &Path) {
    args.push("-i".into());
    args.push(path.as_os_str().to_owned());
}

fn push_all(args: &mut Vec<OsString>, values: &[&str]) {
    args.extend(values.iter().map(OsString::from));
}
