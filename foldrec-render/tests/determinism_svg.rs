use foldrec_core::{ColorScaleRange, GenomicRange, InteractionRecord, TrianglePicker, ValueMode};
use foldrec_render::triangle::TriangleStyle;
use foldrec_render::{ExportConfig, HeatmapScene, MapExporter, TriangleScene};

fn demo_records() -> Vec<InteractionRecord> {
    let mut v = Vec::new();
    for a in 0..20u64 {
        for b in a..20u64 {
            let fq = 1.0 / (1.0 + (b - a) as f64);
            let fdr = if (a + b) % 7 == 0 { 0.3 } else { 0.001 };
            v.push(InteractionRecord::new(1_000_000 + a * 5_000, 1_000_000 + b * 5_000, fq, (b - a) as f64).with_fdr(fdr));
        }
    }
    v
}

fn config() -> ExportConfig {
    ExportConfig {
        width: 640,
        height: 640,
        show_footer: false, // footer carries a timestamp
        title: Some("Determinism Test".into()),
        ..ExportConfig::default()
    }
}

#[test]
fn heatmap_svg_export_is_deterministic() {
    let records = demo_records();
    let scene = HeatmapScene {
        records: &records,
        comparison: None,
        range: GenomicRange::new(1_000_000, 1_100_000).unwrap(),
        step: 5_000,
        mode: ValueMode::Probability,
        scale: ColorScaleRange::for_mode(ValueMode::Probability, None),
        coverage: &[],
        gene: Some(GenomicRange::new(1_020_000, 1_041_000).unwrap()),
    };
    let exporter = MapExporter::new(config());

    let dir = tempfile::tempdir().unwrap();
    let f1 = dir.path().join("a.svg");
    let f2 = dir.path().join("b.svg");
    exporter.export_heatmap_svg(&f1, &scene).unwrap();
    exporter.export_heatmap_svg(&f2, &scene).unwrap();

    let b1 = std::fs::read(&f1).unwrap();
    let b2 = std::fs::read(&f2).unwrap();
    assert_eq!(b1, b2, "SVG bytes differ between identical renders");
}

#[test]
fn triangle_svg_export_is_deterministic() {
    let records = demo_records();
    let comparison: Vec<InteractionRecord> = records.iter().map(|r| InteractionRecord { fq: r.fq / 2.0, ..*r }).collect();
    let cfg = config();
    let mut scene = TriangleScene {
        records: &records,
        comparison: Some(&comparison),
        range: GenomicRange::new(1_000_000, 1_100_000).unwrap(),
        step: 5_000,
        mode: ValueMode::Probability,
        scale: ColorScaleRange::for_mode(ValueMode::Probability, None),
        coverage: &[],
        style: TriangleStyle::default(),
        selection: None,
    };
    let layout = scene.layout(&cfg).unwrap();
    let mut picker = TrianglePicker::new();
    scene.selection = picker.click(&layout, (layout.canvas_width() / 2.0, layout.canvas_height() * 0.6)).cloned();
    assert!(scene.selection.is_some());

    let exporter = MapExporter::new(cfg);
    let dir = tempfile::tempdir().unwrap();
    let f1 = dir.path().join("t1.svg");
    let f2 = dir.path().join("t2.svg");
    exporter.export_triangle_svg(&f1, &scene).unwrap();
    exporter.export_triangle_svg(&f2, &scene).unwrap();
    assert_eq!(std::fs::read(&f1).unwrap(), std::fs::read(&f2).unwrap());
}
