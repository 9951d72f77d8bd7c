use shared::protocol::DashboardSummary;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub(crate) fn index_page(dashboards: &[DashboardSummary]) -> String {
    let items: String = dashboards
        .iter()
        .map(|dashboard| {
            format!(
                "<li><a href=\"/dashboards/{id}\">{title}</a></li>",
                id = escape(dashboard.id.as_str()),
                title = escape(&dashboard.title),
            )
        })
        .collect();
    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>Dashboards</title></head>\
         <body><h1>Dashboards</h1><ul>{items}</ul></body></html>\n"
    )
}

pub(crate) fn dashboard_page(dashboard: &DashboardSummary) -> String {
    DASHBOARD_TEMPLATE
        .replace("%PLOTLY%", PLOTLY_CDN)
        .replace("%TITLE%", &escape(&dashboard.title))
        .replace("%ID%", &escape(dashboard.id.as_str()))
}

// Controls and regions are built from `/api/dashboards/:id`; every control
// change posts the full control state and swaps in the returned regions.
const DASHBOARD_TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>%TITLE%</title>
<script src="%PLOTLY%"></script>
<style>
  h1 { text-align: center; color: #503D36; }
  .chart-row { display: flex; }
  .chart-row > div { flex: 1; }
  .control { margin: 6px 10%; }
</style>
</head>
<body>
<h1>%TITLE%</h1>
<div id="controls"></div>
<div id="regions"></div>
<script>
const DASHBOARD = "%ID%";
const state = {};

function controlElement(id) { return document.getElementById("control-" + id); }

function buildDropdown(spec, holder) {
  const select = document.createElement("select");
  select.id = "control-" + spec.id;
  const placeholder = document.createElement("option");
  placeholder.value = "";
  placeholder.textContent = spec.placeholder || "";
  select.appendChild(placeholder);
  spec.options.forEach((option, index) => {
    const el = document.createElement("option");
    el.value = String(index);
    el.textContent = option.label;
    if (option.value === spec.initial) el.selected = true;
    select.appendChild(el);
  });
  select.addEventListener("change", () => {
    const value = select.value === "" ? null : spec.options[Number(select.value)].value;
    changed(spec.id, value);
  });
  holder.appendChild(select);
}

function buildRange(spec, holder) {
  const wrap = document.createElement("span");
  wrap.id = "control-" + spec.id;
  const [low, high] = spec.initial || [spec.min, spec.max];
  const inputs = [low, high].map((value) => {
    const input = document.createElement("input");
    input.type = "number";
    input.min = spec.min; input.max = spec.max; input.step = spec.step;
    input.value = value;
    wrap.appendChild(input);
    return input;
  });
  inputs.forEach((input) => input.addEventListener("change", () => {
    changed(spec.id, inputs.map((el) => Number(el.value)));
  }));
  holder.appendChild(wrap);
}

function regionElement(id) {
  let el = document.getElementById("region-" + id);
  if (!el) {
    el = document.createElement("div");
    el.id = "region-" + id;
    document.getElementById("regions").appendChild(el);
  }
  return el;
}

function plot(el, figure) {
  Plotly.react(el, figure.data, figure.layout);
}

function apply(regions) {
  for (const region of regions) {
    const content = region.content;
    if (content.kind === "disabled") {
      const el = controlElement(region.output);
      if (el) setDisabled(el, content.value);
      continue;
    }
    const el = regionElement(region.output);
    el.innerHTML = "";
    if (content.kind === "figure") {
      const chart = document.createElement("div");
      el.appendChild(chart);
      plot(chart, content.value);
    } else if (content.kind === "chart_grid") {
      for (const row of content.value) {
        const rowEl = document.createElement("div");
        rowEl.className = "chart-row";
        el.appendChild(rowEl);
        for (const figure of row) {
          const cell = document.createElement("div");
          rowEl.appendChild(cell);
          plot(cell, figure);
        }
      }
    }
  }
}

function setDisabled(el, disabled) {
  el.disabled = disabled;
  el.querySelectorAll("input").forEach((input) => { input.disabled = disabled; });
}

async function changed(id, value) {
  state[id] = value;
  const response = await fetch(`/api/dashboards/${DASHBOARD}/update`, {
    method: "POST",
    headers: { "content-type": "application/json" },
    body: JSON.stringify({ changed: id, controls: state }),
  });
  if (response.ok) apply((await response.json()).regions);
}

async function boot() {
  const layout = await (await fetch(`/api/dashboards/${DASHBOARD}`)).json();
  const panel = document.getElementById("controls");
  for (const spec of layout.controls) {
    state[spec.id] = spec.initial === undefined ? null : spec.initial;
    const holder = document.createElement("div");
    holder.className = "control";
    if (spec.label) {
      const label = document.createElement("label");
      label.textContent = spec.label;
      holder.appendChild(label);
    }
    if (spec.type === "dropdown") buildDropdown(spec, holder);
    else buildRange(spec, holder);
    panel.appendChild(holder);
  }
  apply(layout.initial);
}

boot();
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_in_titles() {
        assert_eq!(escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn dashboard_page_embeds_id_and_title() {
        let page = dashboard_page(&DashboardSummary {
            id: "launch-records".into(),
            title: "Launch <Records>".into(),
        });
        assert!(page.contains("const DASHBOARD = \"launch-records\";"));
        assert!(page.contains("<title>Launch &lt;Records&gt;</title>"));
        assert!(!page.contains("%ID%"));
    }
}
