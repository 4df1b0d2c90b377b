use std::path::Path;
use std::process::Command;

use itertools::Itertools;
use log::info;
use plotters::prelude::*;

use crate::datafile::DataFile;
use crate::error::{Result, TraceError};

// A4 portrait at roughly 100 dpi
const PAGE_WIDTH: u32 = 827;
const PAGE_HEIGHT: u32 = 1169;
// shorter page for the single-panel case
const SINGLE_PANEL_HEIGHT: u32 = 500;

// fixed page margins in pixels, no automatic layout,
// so multi-panel pages line up across invocations
const MARGIN_TOP: i32 = 40;
const MARGIN_BOTTOM: i32 = 40;
const MARGIN_LEFT: i32 = 70;
const MARGIN_RIGHT: i32 = 30;
// vertical gap between stacked panels
const PANEL_GAP: i32 = 18;

/// fixed name of the rendered page
pub const PLOT_FILE: &str = "traces.svg";

fn draw_err(e: impl std::fmt::Display) -> TraceError {
    TraceError::Draw(e.to_string())
}

/// Render one stacked panel per trace column onto a single page.
/// Column 0 supplies the shared x axis; the title on the first panel
/// comes from the "Species" and "EOD Rate" header fields.
pub fn plot_traces(fname: &Path, df: &DataFile) -> Result<()> {
    let npanels = match df.key.data_columns() {
        Some(n) if n > 0 => n,
        _ => return Err(TraceError::EmptyKeyTable),
    };
    if npanels + 1 > df.data.ncols() {
        return Err(TraceError::ColumnCount {
            expected: npanels,
            got: df.data.ncols().saturating_sub(1),
        });
    }
    if df.data.nrows() == 0 {
        return Err(TraceError::Draw("no data rows to plot".to_string()));
    }

    let title = format!(
        "{}  EOD Rate: {}",
        df.header.require("Species")?,
        df.header.require("EOD Rate")?
    );
    let x0 = df.data[[0, 0]];
    let x1 = df.data[[df.data.nrows() - 1, 0]];

    let height = if npanels == 1 {
        SINGLE_PANEL_HEIGHT
    } else {
        PAGE_HEIGHT
    };
    let root = SVGBackend::new(fname, (PAGE_WIDTH, height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let page = root.margin(MARGIN_TOP, MARGIN_BOTTOM, MARGIN_LEFT, MARGIN_RIGHT);
    let panels = page.split_evenly((npanels, 1));

    for (i, panel) in panels.iter().enumerate() {
        let col = i + 1;
        let panel = panel.margin(PANEL_GAP / 2, PANEL_GAP / 2, 0, 0);
        let column = df.data.column(col);
        let (mut ymin, mut ymax) = column
            .iter()
            .copied()
            .minmax()
            .into_option()
            .expect("row count already checked");
        if ymin == ymax {
            // flat trace, give the axis some room
            ymin -= 0.5;
            ymax += 0.5;
        }

        let mut builder = ChartBuilder::on(&panel);
        builder.x_label_area_size(28).y_label_area_size(55);
        if i == 0 {
            builder.caption(&title, ("sans-serif", 20));
        }
        let mut chart = builder
            .build_cartesian_2d(x0..x1, ymin..ymax)
            .map_err(draw_err)?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(df.key.label(0))
            .y_desc(df.key.label(col))
            // absolute tick values, no offset notation
            .y_label_formatter(&|y| format!("{}", y))
            .draw()
            .map_err(draw_err)?;
        chart
            .draw_series(LineSeries::new(
                df.data.rows().into_iter().map(|r| (r[0], r[col])),
                &BLACK,
            ))
            .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    info!("wrote {} panel(s) to {}", npanels, fname.display());
    Ok(())
}

/// Reflow the rendered page to PostScript and hand it to the spooler.
/// Blocks until the pipeline finishes; a non-zero exit is fatal.
pub fn print_page(fname: &Path) -> Result<()> {
    let status = Command::new("sh")
        .arg("-c")
        .arg(format!("rsvg-convert -f ps {} | lpr", fname.display()))
        .status()?;
    if !status.success() {
        return Err(TraceError::PrintPipeline(status));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACES: &str = "\
#Species: Eigenmannia virescens
#EOD Rate: 312Hz
#Key
# t     V-1   V-2
# s     mV    mV
0.000   1.25  -0.5
0.001   1.50  -0.25
0.002   1.75  0.0
";

    fn render(input: &str) -> (tempfile::TempDir, Result<()>) {
        let df = DataFile::parse(input.as_bytes()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let res = plot_traces(&dir.path().join(PLOT_FILE), &df);
        (dir, res)
    }

    #[test]
    fn test_plot_traces_writes_svg() {
        let (dir, res) = render(TRACES);
        res.unwrap();
        let svg = std::fs::read_to_string(dir.path().join(PLOT_FILE)).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Eigenmannia virescens"));
    }

    #[test]
    fn test_single_panel_page() {
        let input = "\
#Species: x
#EOD Rate: 1Hz
#Key
# t V
# s mV
0.0 1.0
1.0 2.0
";
        let (dir, res) = render(input);
        res.unwrap();
        assert!(dir.path().join(PLOT_FILE).exists());
    }

    #[test]
    fn test_missing_header_field() {
        let input = "#Key\n# t V\n0.0 1.0\n1.0 2.0\n";
        let (_dir, res) = render(input);
        assert!(matches!(res, Err(TraceError::MissingField(f)) if f == "Species"));
    }

    #[test]
    fn test_missing_key_table() {
        let input = "#Species: x\n#EOD Rate: 1Hz\n0.0 1.0\n";
        let (_dir, res) = render(input);
        assert!(matches!(res, Err(TraceError::EmptyKeyTable)));
    }

    #[test]
    fn test_key_wider_than_data() {
        let input = "\
#Species: x
#EOD Rate: 1Hz
#Key
# t V-1 V-2
# s mV  mV
0.0 1.0
1.0 2.0
";
        let (_dir, res) = render(input);
        assert!(matches!(
            res,
            Err(TraceError::ColumnCount {
                expected: 2,
                got: 1
            })
        ));
    }
}
