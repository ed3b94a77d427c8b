use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};
use xmly_downloader::service::{AlbumSummary, TrackRecord};
use xmly_downloader::{Completion, ProgressSample, XmlyService};
use xmly_api::AlbumType;

use crate::error::CliError;

const LOGIN_POLL_INTERVAL: Duration = Duration::from_secs(2);
const LOGIN_TIMEOUT: Duration = Duration::from_secs(180);

pub struct CommandExecutor {
    service: XmlyService,
    cookie: Option<String>,
    json: bool,
}

impl CommandExecutor {
    pub fn new(service: XmlyService, cookie: Option<String>, json: bool) -> Self {
        Self {
            service,
            cookie,
            json,
        }
    }

    fn cookie(&self) -> Result<&str, CliError> {
        self.cookie.as_deref().ok_or(CliError::MissingCookie)
    }

    /// Print `value` as JSON, or through `pretty` otherwise.
    fn emit<T: Serialize>(&self, value: &T, pretty: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            pretty(value);
        }
        Ok(())
    }

    pub async fn album(&self, album_id: i64) -> Result<()> {
        let album = self.service.album_info(album_id).await?;
        self.emit(&album, print_album)
    }

    pub async fn tracks(&self, album_id: i64, page: u32, desc: bool) -> Result<()> {
        let page = self.service.track_list(album_id, page, !desc).await?;
        self.emit(&page, |page| {
            for track in &page.tracks {
                print_track(track);
            }
            println!("pages: {}", page.max_page_id);
        })
    }

    pub async fn track(&self, track_id: i64) -> Result<()> {
        let track = self
            .service
            .charge_track_info(track_id, self.cookie()?)
            .await?;
        self.emit(&track, print_track)
    }

    pub async fn user(&self) -> Result<()> {
        let user = self.service.user_info(self.cookie()?).await?;
        self.emit(&user, |user| {
            if user.uid == 0 {
                println!("not logged in ({}): {}", user.ret, user.msg);
            } else {
                let vip = if user.is_vip { " [VIP]" } else { "" };
                println!("{} (uid {}){vip}", user.nickname, user.uid);
            }
        })
    }

    pub async fn login(&self, qr_file: &Path) -> Result<()> {
        let qr = self.service.qr_code().await?;
        if qr.ret != 0 {
            return Err(CliError::QrCodeRejected {
                ret: qr.ret,
                msg: qr.msg,
            }
            .into());
        }

        // The image may come as a data URI.
        let encoded = qr.img.rsplit(',').next().unwrap_or_default();
        let png = STANDARD.decode(encoded.trim()).map_err(CliError::from)?;
        tokio::fs::write(qr_file, png)
            .await
            .with_context(|| format!("failed to write {}", qr_file.display()))?;
        eprintln!(
            "Scan {} with the Ximalaya app to log in",
            qr_file.display()
        );

        let deadline = Instant::now() + LOGIN_TIMEOUT;
        loop {
            tokio::time::sleep(LOGIN_POLL_INTERVAL).await;
            if let Some(cookie) = self.service.check_qr_code(&qr.qr_id).await {
                info!("Login confirmed");
                #[derive(Serialize)]
                struct Login<'a> {
                    cookie: &'a str,
                }
                return self.emit(&Login { cookie: &cookie }, |login| println!("{}", login.cookie));
            }
            if Instant::now() >= deadline {
                return Err(CliError::LoginTimeout(LOGIN_TIMEOUT).into());
            }
            debug!(qr_id = %qr.qr_id, "Waiting for QR confirmation");
        }
    }

    pub async fn download(&self, url: &str, output: &Path, id: i64) -> Result<()> {
        let bar = if self.json {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner} [{elapsed_precise}] {wide_bar} {bytes}/{total_bytes} ({bytes_per_sec})",
            )?
            .progress_chars("=> "),
        );

        let sink = |sample: ProgressSample| {
            if let Some(total) = sample.expected_size {
                bar.set_length(total);
            }
            bar.set_position(sample.bytes_transferred);
        };
        let result = self.service.download_file(url, output, id, &sink).await;
        bar.finish_and_clear();
        let completion = result?;

        #[derive(Serialize)]
        struct Downloaded<'a> {
            path: &'a Path,
            completion: Completion,
        }
        self.emit(
            &Downloaded {
                path: output,
                completion,
            },
            |d| match d.completion {
                Completion::Transferred => println!("saved {}", d.path.display()),
                Completion::AlreadyPresent => println!("{} is already complete", d.path.display()),
            },
        )
    }
}

fn album_type_label(album_type: AlbumType) -> &'static str {
    match album_type {
        AlbumType::Free => "free",
        AlbumType::VipFree => "free for VIP",
        AlbumType::Paid => "paid",
    }
}

fn print_album(album: &AlbumSummary) {
    println!("{}", album.title);
    println!("  tracks: {}", album.track_count);
    println!("  type:   {}", album_type_label(album.album_type));
    if let Some(ids) = album.free_track_ids.as_deref().filter(|ids| !ids.is_empty()) {
        println!("  free:   {ids}");
    }
}

fn print_track(track: &TrackRecord) {
    let url = track
        .play_path_aacv164
        .as_deref()
        .or(track.play_url64.as_deref())
        .or(track.play_path_aacv224.as_deref())
        .or(track.play_url32.as_deref())
        .unwrap_or("-");
    println!(
        "{:>10}  {:>3}:{:02}  {}  {url}",
        track.track_id,
        track.duration / 60,
        track.duration % 60,
        track.title
    );
}
