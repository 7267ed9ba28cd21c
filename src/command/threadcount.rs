/// Number of files to process at the same time. Each file is read by one worker,
/// so unless asked for more, the files are processed one after the other
pub fn determine_worker_count(requested: Option<usize>) -> anyhow::Result<usize> {
    some_min1(requested)
}

/// Number of cores on this machine
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

pub fn some_min1(t: Option<usize>) -> anyhow::Result<usize> {
    if let Some(t) = t {
        if t < 1 {
            anyhow::bail!("Cannot set number of threads to less than 1")
        } else {
            anyhow::Ok(t)
        }
    } else {
        anyhow::Ok(1)
    }
}
