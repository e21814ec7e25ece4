use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;
use swarmform_structs::mission::MissionRecord;

/// Writes one pretty-printed JSON record per mission, named by waypoint
/// count and wall-clock epoch so successive runs never collide.
pub fn save_mission_record(dir: &Path, record: &MissionRecord) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let path = dir.join(format!("mission_{}_{}.json", record.num_points, epoch));
    let json = serde_json::to_string_pretty(record)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(&path, json)?;
    info!("saved mission record to {}", path.display());
    Ok(path)
}
