use anyhow::Result;

fn main() -> Result<()> {
    harborview::run()
}
