//! Server-rendered admin table.
//!
//! Every collected string is attacker controlled and is entity-encoded
//! before it reaches the page. Screenshots are only embedded when they are
//! `data:image/` URIs and urls only become links for http(s).

use xss_core::{
    cell_text, encode_html_entities as esc, is_image_data_uri, IngestRecord, COLLAPSED_CHARS,
};

/// How long the "copied" indicator stays visible.
pub const COPY_NOTICE_MS: u64 = 2000;

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 24px; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ccc; padding: 8px; vertical-align: top; text-align: left; }
td.text { word-break: break-all; max-width: 420px; }
.toggle { font-size: 11px; margin-left: 6px; cursor: pointer; }
.thumb { width: 120px; height: 80px; object-fit: contain; cursor: zoom-in; }
.toolbar { margin-bottom: 16px; display: flex; gap: 12px; align-items: center; }
#copy-notice { color: #2a7a2a; visibility: hidden; }
#modal { display: none; position: fixed; inset: 0; background: rgba(0,0,0,0.8);
         align-items: center; justify-content: center; }
#modal img { max-width: 95vw; max-height: 95vh; }
"#;

const SCRIPT: &str = r#"
function toggleCell(button) {
    var cell = button.parentElement;
    var short = cell.querySelector('.short');
    var full = cell.querySelector('.full');
    var expanded = full.hidden;
    full.hidden = !expanded;
    short.hidden = expanded;
    button.textContent = expanded ? 'less' : 'more';
}

function deleteRecord(id) {
    fetch('/admin/api/records/' + id, { method: 'DELETE' })
        .then(function (r) { return r.json(); })
        .then(function (body) {
            if (!body.success) { throw new Error(body.error); }
            var row = document.querySelector('tr[data-id="' + id + '"]');
            if (row) { row.remove(); }
            refreshEmpty();
        })
        .catch(function () { alert('Delete failed, please retry'); });
}

function deleteAll() {
    if (!confirm('Delete ALL records? This cannot be undone.')) { return; }
    fetch('/admin/api/records?confirm=true', { method: 'DELETE' })
        .then(function (r) { return r.json(); })
        .then(function (body) {
            if (!body.success) { throw new Error(body.error); }
            document.querySelectorAll('tr[data-id]').forEach(function (row) { row.remove(); });
            refreshEmpty();
        })
        .catch(function () { alert('Delete all failed, please retry'); });
}

function refreshEmpty() {
    var empty = document.getElementById('empty-row');
    empty.hidden = document.querySelectorAll('tr[data-id]').length > 0;
}

function copyPayload() {
    var decoder = document.createElement('textarea');
    decoder.innerHTML = document.getElementById('payload').dataset.encoded;
    navigator.clipboard.writeText(decoder.value).then(function () {
        var notice = document.getElementById('copy-notice');
        notice.style.visibility = 'visible';
        setTimeout(function () { notice.style.visibility = 'hidden'; }, __COPY_NOTICE_MS__);
    }).catch(function () { alert('Copy failed'); });
}

function openPreview(img) {
    var modal = document.getElementById('modal');
    modal.querySelector('img').src = img.src;
    modal.style.display = 'flex';
}

function closePreview() {
    document.getElementById('modal').style.display = 'none';
}
"#;

fn text_cell(value: &str) -> String {
    if value.chars().count() <= COLLAPSED_CHARS {
        return format!(r#"<td class="text">{}</td>"#, esc(value));
    }
    format!(
        r#"<td class="text"><span class="short">{}</span><span class="full" hidden>{}</span><button class="toggle" onclick="toggleCell(this)">more</button></td>"#,
        esc(&cell_text(value, false)),
        esc(value)
    )
}

fn url_cell(url: &str) -> String {
    let cell = text_cell(url);
    if url.starts_with("http://") || url.starts_with("https://") {
        let link = format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">open</a> "#,
            esc(url)
        );
        cell.replacen(r#"<td class="text">"#, &format!(r#"<td class="text">{link}"#), 1)
    } else {
        cell
    }
}

fn screenshot_cell(record: &IngestRecord) -> String {
    match record.screenshot.as_deref() {
        Some(shot) if is_image_data_uri(shot) => format!(
            r#"<td><img class="thumb" src="{}" alt="Screenshot" onclick="openPreview(this)"></td>"#,
            esc(shot)
        ),
        Some(shot) if !shot.is_empty() => "<td><em>unrenderable screenshot</em></td>".to_string(),
        _ => "<td></td>".to_string(),
    }
}

fn render_row(record: &IngestRecord) -> String {
    format!(
        r#"<tr data-id="{id}"><td>{id}</td>{url}{cookie}{shot}<td>{time}</td><td><button onclick="deleteRecord({id})">Delete</button></td></tr>"#,
        id = record.id,
        url = url_cell(&record.url),
        cookie = text_cell(&record.cookie),
        shot = screenshot_cell(record),
        time = esc(&record.trigger_time),
    )
}

/// Full admin page for `records`; `encoded_payload` is the entity-encoded
/// snippet the copy button decodes.
pub fn render_admin_page(records: &[IngestRecord], encoded_payload: &str) -> String {
    let rows: String = records.iter().map(render_row).collect();
    let empty_hidden = if records.is_empty() { "" } else { " hidden" };
    let script = SCRIPT.replace("__COPY_NOTICE_MS__", &COPY_NOTICE_MS.to_string());

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>XSS Records</title>
<style>{STYLE}</style>
</head>
<body>
<h1>XSS Records</h1>
<div class="toolbar">
  <button id="payload" data-encoded="{payload}" onclick="copyPayload()">Copy payload</button>
  <span id="copy-notice">Copied!</span>
  <button onclick="deleteAll()">Delete all</button>
</div>
<table>
<thead>
<tr><th>ID</th><th>URL</th><th>Cookie</th><th>Screenshot</th><th>Trigger Time</th><th>Actions</th></tr>
</thead>
<tbody>
{rows}<tr id="empty-row"{empty_hidden}><td colspan="6">No records</td></tr>
</tbody>
</table>
<div id="modal" onclick="closePreview()"><img alt="Screenshot preview"></div>
<script>{script}</script>
</body>
</html>"#,
        payload = esc(encoded_payload),
    )
}
