//! Text rendering of lookup reports.
//!
//! Pure formatting: every number and decision shown here was already made by
//! the aggregator. `Styles::default()` renders without escape codes.

use std::fmt::{Display, Write};

use owo_colors::{OwoColorize, Style};

use ddiq_core::{Field, GatewayAddresses, IpReport, NetworkReport, UtilizationStats, Warning};

const RULE_WIDTH: usize = 67;
const LABEL_WIDTH: usize = 24;
const BULLET_WIDTH: usize = 20;
const UNKNOWN: &str = "unknown";
const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S UTC";

#[derive(Clone, Debug, Default)]
pub struct Styles {
    pub rule: Style,
    pub title: Style,
    pub heading: Style,
    pub unknown: Style,
    pub warning: Style,
}

impl Styles {
    pub fn colorize(&mut self) {
        self.rule = Style::new().cyan();
        self.title = Style::new().bold().cyan();
        self.heading = Style::new().bold();
        self.unknown = Style::new().dimmed();
        self.warning = Style::new().yellow();
    }
}

// ── Line builder ─────────────────────────────────────────────────────

struct Page<'a> {
    out: String,
    styles: &'a Styles,
}

impl<'a> Page<'a> {
    fn new(title: &str, styles: &'a Styles) -> Self {
        let mut page = Self {
            out: String::new(),
            styles,
        };
        page.rule();
        let indent = RULE_WIDTH.saturating_sub(title.len()) / 2;
        page.line(format_args!(
            "{:indent$}{}",
            "",
            title.style(styles.title)
        ));
        page.rule();
        page.blank();
        page
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        let _ = self.out.write_fmt(args);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn rule(&mut self) {
        let rule = "═".repeat(RULE_WIDTH);
        self.line(format_args!("{}", rule.style(self.styles.rule)));
    }

    fn heading(&mut self, text: &str) {
        self.line(format_args!("{}", text.style(self.styles.heading)));
    }

    fn field(&mut self, label: &str, value: impl Display) {
        let label = format!("{label}:");
        self.line(format_args!("{label:<LABEL_WIDTH$}{value}"));
    }

    fn bullet(&mut self, label: &str, value: impl Display) {
        let label = format!("{label}:");
        self.line(format_args!("  • {label:<BULLET_WIDTH$}{value}"));
    }

    fn unknown(&self) -> String {
        UNKNOWN.style(self.styles.unknown).to_string()
    }

    /// `unknown` for a failed lookup, `none` when it found nothing.
    fn lookup<T>(&self, field: &Field<Option<T>>, show: impl Fn(&T) -> String) -> String {
        match field {
            Field::Unknown => self.unknown(),
            Field::Known(None) => "none".into(),
            Field::Known(Some(v)) => show(v),
        }
    }

    fn known<T: Display>(&self, field: &Field<T>) -> String {
        field.known().map_or_else(|| self.unknown(), ToString::to_string)
    }

    fn warnings(&mut self, warnings: &[Warning]) {
        if warnings.is_empty() {
            return;
        }
        self.blank();
        self.line(format_args!("{}", "Warnings:".style(self.styles.warning)));
        for warning in warnings {
            self.line(format_args!(
                "  {} {}",
                "!".style(self.styles.warning),
                warning
            ));
        }
    }

    fn finish(mut self) -> String {
        self.rule();
        self.out
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn gateway_line(gateways: &GatewayAddresses) -> String {
    if gateways.addresses.is_empty() {
        return "none".into();
    }
    let list = gateways
        .addresses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    if gateways.inferred {
        format!("{list} (assumed: first usable host)")
    } else {
        list
    }
}

fn attributes<'k>(page: &mut Page<'_>, attrs: impl IntoIterator<Item = (&'k String, &'k String)>) {
    page.heading("Extensible Attributes:");
    for (key, value) in attrs {
        page.line(format_args!("  • {key:<BULLET_WIDTH$} {value}"));
    }
}

fn utilization(page: &mut Page<'_>, stats: &UtilizationStats) {
    let used = page.known(&stats.used);
    let free = page.known(&stats.free);
    match stats.percent_used.known() {
        Some(pct) => {
            page.bullet("IPs Used", format_args!("{used} ({pct:.1}%)"));
            page.bullet("IPs Free", format_args!("{free} ({:.1}%)", 100.0 - pct));
        }
        None => {
            page.bullet("IPs Used", used);
            page.bullet("IPs Free", free);
        }
    }
}

// ── Network report ───────────────────────────────────────────────────

pub fn render_network(report: &NetworkReport, styles: &Styles) -> String {
    let mut page = Page::new("NETWORK INFORMATION", styles);

    page.field("Network", report.network);
    if let Some(ref view) = report.network_view {
        page.field("Network View", view);
    }
    page.field("Network Container", &report.container);
    page.field("Comment", report.comment.as_deref().unwrap_or("none"));
    page.blank();

    if report.extensible_attributes.is_empty() {
        page.field("Extensible Attributes", "none");
    } else {
        attributes(&mut page, &report.extensible_attributes);
    }
    page.blank();

    page.heading("IP Address Statistics:");
    page.bullet("Total Usable IPs", report.utilization.total);
    utilization(&mut page, &report.utilization);
    page.bullet("Network Address", report.network_address);
    page.bullet(
        "Broadcast Address",
        report
            .broadcast_address
            .map_or_else(|| "n/a".to_owned(), |b| b.to_string()),
    );
    page.blank();

    page.heading("Gateway Configuration:");
    page.bullet("Default Gateway", gateway_line(&report.gateways));
    page.blank();

    let dhcp = &report.dhcp;
    page.heading("DHCP Configuration:");
    page.bullet("DHCP Enabled", yes_no(dhcp.enabled));
    if !dhcp.members.is_empty() {
        page.bullet("DHCP Members", dhcp.members.join(", "));
    }
    match dhcp.ranges.known() {
        None => {
            let unknown = page.unknown();
            page.bullet("DHCP Range", unknown);
        }
        Some(ranges) if ranges.is_empty() => page.bullet("DHCP Range", "none"),
        Some(ranges) => {
            for range in ranges {
                page.bullet("DHCP Range", format_args!("{} - {}", range.start, range.end));
            }
            let free = page.known(&dhcp.free);
            page.bullet("DHCP Free", free);
        }
    }
    page.blank();

    page.heading("DNS Zones:");
    page.bullet("Forward Zone", report.dns.forward.as_deref().unwrap_or("none"));
    page.bullet("Reverse Zone", report.dns.reverse.as_deref().unwrap_or("none"));
    page.blank();

    let modification = &report.modification;
    let modified = modification
        .last_modified
        .map_or_else(|| page.unknown(), |t| t.format(TIMESTAMP).to_string());
    let modified_by = modification
        .last_modified_by
        .clone()
        .unwrap_or_else(|| page.unknown());
    page.heading("Modification:");
    page.bullet("Last Modified", modified);
    page.bullet("Modified By", modified_by);
    page.blank();

    page.field(
        "Reference",
        report.reference.as_ref().map_or("none", |r| r.as_str()),
    );
    page.warnings(&report.warnings);
    page.finish()
}

// ── IP report ────────────────────────────────────────────────────────

pub fn render_ip(report: &IpReport, styles: &Styles) -> String {
    let mut page = Page::new("IP ADDRESS INFORMATION", styles);

    page.field("IP Address", report.ip);
    page.field("Status", report.status.state);
    page.field("Allocation", &report.allocation);
    page.field("MAC Address", report.mac().unwrap_or("none"));
    page.field("Hostname", report.hostname().unwrap_or("none"));
    if !report.status.types.is_empty() {
        page.field("Object Types", report.status.types.join(", "));
    }
    if !report.status.usage.is_empty() {
        page.field("Usage", report.status.usage.join(", "));
    }
    page.blank();

    page.heading("DHCP:");
    let fixed = page.lookup(&report.fixed_address, |fa| {
        let mac = fa.mac.as_deref().unwrap_or("no MAC");
        match fa.hostname {
            Some(ref name) => format!("{mac} ({name})"),
            None => mac.to_owned(),
        }
    });
    page.bullet("Fixed Address", fixed);
    let lease = page.lookup(&report.lease, |lease| {
        let state = lease.binding_state.as_deref().unwrap_or("UNKNOWN STATE");
        match lease.ends {
            Some(ends) => format!("{state} until {}", ends.format(TIMESTAMP)),
            None => state.to_owned(),
        }
    });
    page.bullet("Lease", lease);
    page.blank();

    page.heading("DNS Records:");
    let forward = page.lookup(&report.forward, |r| format!("{} ({})", r.hostname, r.kind));
    page.bullet("Forward", forward);
    match report.forward {
        Field::Unknown => {
            let unknown = page.unknown();
            page.bullet("Last Queried", unknown);
        }
        Field::Known(None) => {}
        Field::Known(Some(ref record)) => page.bullet(
            "Last Queried",
            record
                .last_queried
                .map_or_else(|| "never".to_owned(), |t| t.format(TIMESTAMP).to_string()),
        ),
    }
    let reverse = page.lookup(&report.reverse, |r| r.hostname.clone());
    page.bullet("PTR", reverse);
    let host = page.lookup(&report.host_record, |h| match h.comment {
        Some(ref comment) => format!("{} ({comment})", h.name),
        None => h.name.clone(),
    });
    page.bullet("Host Record", host);
    page.bullet("Consistency", report.consistency);
    page.blank();

    if let Some(attrs) = report.extensible_attributes() {
        attributes(&mut page, attrs);
        page.blank();
    }

    page.heading("Parent Network:");
    match report.network {
        Field::Unknown => {
            let unknown = page.unknown();
            page.bullet("Network", unknown);
        }
        Field::Known(None) => page.bullet("Network", "none"),
        Field::Known(Some(ref net)) => {
            match net.comment {
                Some(ref comment) if !comment.is_empty() => {
                    page.bullet("Network", format_args!("{} ({comment})", net.network));
                }
                _ => page.bullet("Network", net.network),
            }
            page.bullet("Container", &net.container);
            page.bullet("Default Gateway", gateway_line(&net.gateways));
            page.bullet("DHCP Enabled", yes_no(net.dhcp_enabled));
        }
    }

    page.warnings(&report.warnings);
    page.finish()
}
