use console::Style;
use voxview_core::register::RegistrationConfig;
use voxview_core::segment::RegionStats;
use voxview_core::types::VolumeInfo;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn print_title(s: &Styles, title: &str) {
    println!();
    println!("  {}", s.title.apply_to(title));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(title.chars().count())));
    println!();
}

pub fn print_volume_summary(info: &VolumeInfo) {
    let s = Styles::new();
    print_title(&s, "Volume");

    match info.source {
        Some(ref path) => println!(
            "  {:<14}{}",
            s.label.apply_to("Source"),
            s.path.apply_to(path.display())
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Source"),
            s.disabled.apply_to("in memory")
        ),
    }
    let [depth, rows, cols] = info.shape;
    println!(
        "  {:<14}{}",
        s.label.apply_to("Shape"),
        s.value.apply_to(format!("{depth} x {rows} x {cols}"))
    );
    match info.spacing {
        Some([a, b, c]) => println!(
            "  {:<14}{}",
            s.label.apply_to("Spacing"),
            s.value.apply_to(format!("{a} x {b} x {c} mm"))
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Spacing"),
            s.disabled.apply_to("unknown")
        ),
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Range"),
        s.value
            .apply_to(format!("{} .. {}", info.min_value, info.max_value))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Header"),
        s.value.apply_to(format!("{} elements", info.header_elements))
    );
    println!();
}

pub fn print_regions(regions: &[RegionStats]) {
    let s = Styles::new();
    println!("  {}", s.header.apply_to("Regions"));
    if regions.is_empty() {
        println!("    {}", s.disabled.apply_to("none"));
    }
    for region in regions {
        let bbox: Vec<String> = region
            .bbox
            .iter()
            .map(|(lo, hi)| format!("{lo}..={hi}"))
            .collect();
        println!(
            "    {:<8}{:<14}{}",
            s.method.apply_to(region.label),
            s.value.apply_to(format!("{} px", region.area)),
            s.label.apply_to(bbox.join(" x "))
        );
    }
    println!();
}

pub fn print_registration_summary(config: &RegistrationConfig) {
    let s = Styles::new();
    print_title(&s, "Registration");

    println!(
        "  {:<14}{}",
        s.label.apply_to("Optimizer"),
        s.method.apply_to(format!("{:?}", config.optimizer))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Metric"),
        s.method.apply_to(format!("{:?}", config.metric))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Interpolation"),
        s.method.apply_to(format!("{:?}", config.interpolation))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Step"),
        s.value.apply_to(config.learning_rate)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Iterations"),
        s.value.apply_to(config.iterations)
    );
    println!();
}
