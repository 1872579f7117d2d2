//! Burn a label track into a video.

use std::io::Write;
use std::path::PathBuf;

use motiontrace_common::config::AppConfig;
use motiontrace_render_engine::export::{
    export_labeled_video, ExportJob, ExportProgress, ExportStage,
};
use motiontrace_render_engine::overlay::OverlayStyle;

pub async fn run(
    video: PathBuf,
    labels: PathBuf,
    output: Option<PathBuf>,
    config: AppConfig,
) -> anyhow::Result<()> {
    println!("Exporting labeled video: {}", video.display());

    let output_path = output.unwrap_or_else(|| {
        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        config.output_dir.join(format!("{stem}_labeled.mp4"))
    });
    let style = OverlayStyle::from_defaults(&config.overlay)?;

    println!("  Labels: {}", labels.display());
    println!("  Output: {}", output_path.display());

    let job = ExportJob {
        video_path: video,
        label_track: labels,
        output_path,
        style,
    };

    let progress_cb: Box<dyn Fn(ExportProgress) + Send> = Box::new(|p| {
        if p.stage == ExportStage::Encoding {
            print!(
                "\r  Progress: {:.1}% ({:.1}s encoded, ETA: {:.0}s)  ",
                p.progress * 100.0,
                p.out_time_secs,
                p.eta_secs,
            );
            let _ = std::io::stdout().flush();
        }
    });

    let written = export_labeled_video(job, Some(progress_cb))
        .await
        .map_err(|e| anyhow::anyhow!("Export failed: {e}"))?;
    println!("\nExport complete: {}", written.display());

    Ok(())
}
