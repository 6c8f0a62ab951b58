//! Embedded dashboard.
//!
//! A single self-contained page with six views: dashboard, website scan,
//! audio scan, threat intelligence, recovery guidance, and support chat.
//! All durable state lives behind the REST API; the page holds only the
//! active view, cached incident list, and per-form in-flight flags.

use axum::response::{Html, IntoResponse};

/// Serve the dashboard page.
pub async fn page() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>CyberGuard — Cyber Safety Dashboard</title>
<style>
  :root { --bg: #0a0e17; --card: #111827; --border: #1f2937; --text: #e5e7eb; --accent: #6366f1; --danger: #f43f5e; --warn: #f59e0b; --success: #10b981; --muted: #6b7280; }
  * { margin: 0; padding: 0; box-sizing: border-box; }
  body { background: var(--bg); color: var(--text); font-family: 'SF Mono', 'Fira Code', monospace; }
  .header { background: linear-gradient(135deg, #1e1b4b, #0a0e17); padding: 20px 30px; border-bottom: 1px solid var(--border); display: flex; justify-content: space-between; align-items: center; }
  .header h1 { font-size: 1.4em; color: var(--accent); }
  .header .status { display: flex; gap: 20px; font-size: 0.85em; align-items: center; }
  .header .dot { display: inline-block; width: 8px; height: 8px; border-radius: 50%; background: var(--success); margin-right: 6px; animation: pulse 2s infinite; }
  @keyframes pulse { 0%, 100% { opacity: 1; } 50% { opacity: 0.5; } }
  nav { display: flex; gap: 8px; padding: 14px 30px; border-bottom: 1px solid var(--border); flex-wrap: wrap; }
  nav button { background: var(--card); color: var(--muted); border: 1px solid var(--border); border-radius: 6px; padding: 8px 14px; font-family: inherit; font-size: 0.8em; cursor: pointer; }
  nav button.active { color: var(--text); border-color: var(--accent); background: #1e1b4b; }
  section { display: none; padding: 24px 30px; }
  section.active { display: block; }
  .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 16px; margin-bottom: 24px; }
  .card { background: var(--card); border: 1px solid var(--border); border-radius: 8px; padding: 16px; }
  .card h3 { font-size: 0.75em; color: var(--muted); text-transform: uppercase; letter-spacing: 1px; margin-bottom: 8px; }
  .card .value { font-size: 2em; font-weight: bold; }
  .value.blue { color: var(--accent); } .value.red { color: var(--danger); } .value.green { color: var(--success); } .value.yellow { color: var(--warn); }
  .row { display: flex; gap: 10px; margin-bottom: 16px; }
  input[type=text], textarea { flex: 1; background: #0d1220; color: var(--text); border: 1px solid var(--border); border-radius: 6px; padding: 12px; font-family: inherit; font-size: 0.9em; }
  textarea { min-height: 140px; resize: vertical; }
  button.primary { background: var(--accent); color: white; border: none; border-radius: 6px; padding: 12px 22px; font-family: inherit; font-weight: bold; cursor: pointer; }
  button.primary:disabled { opacity: 0.5; cursor: not-allowed; }
  button.ghost { background: var(--card); color: var(--text); border: 1px solid var(--border); border-radius: 6px; padding: 12px 18px; font-family: inherit; cursor: pointer; }
  .result { border-radius: 8px; border: 1px solid var(--border); padding: 20px; margin-top: 16px; display: none; }
  .result.safe { border-color: var(--success); background: rgba(16,185,129,0.06); }
  .result.flagged { border-color: var(--danger); background: rgba(244,63,94,0.06); }
  .result h2 { margin-bottom: 6px; }
  .badge { display: inline-block; padding: 4px 10px; border-radius: 999px; font-size: 0.7em; font-weight: bold; letter-spacing: 1px; margin: 2px 4px 2px 0; }
  .badge.reason { background: #1e1b4b; color: #c7d2fe; border: 1px solid var(--accent); }
  .badge.saved { background: rgba(16,185,129,0.15); color: var(--success); border: 1px solid var(--success); }
  .badge.unsaved { background: rgba(245,158,11,0.15); color: var(--warn); border: 1px solid var(--warn); }
  .meter { height: 10px; background: var(--border); border-radius: 5px; overflow: hidden; margin: 10px 0 4px; }
  .meter .fill { height: 100%; background: var(--danger); transition: width 0.4s; }
  .notice { display: none; margin-top: 12px; padding: 12px; border: 1px solid var(--danger); border-radius: 6px; color: var(--danger); font-size: 0.85em; }
  .list { background: var(--card); border: 1px solid var(--border); border-radius: 8px; max-height: 420px; overflow-y: auto; }
  .list .item { padding: 10px 14px; border-bottom: 1px solid var(--border); font-size: 0.8em; display: grid; grid-template-columns: 90px 1fr 60px 170px; gap: 10px; align-items: center; }
  .list .item:last-child { border-bottom: none; }
  .kind { font-weight: bold; }
  .kind.website { color: var(--accent); } .kind.audio { color: var(--danger); }
  .empty { padding: 24px; text-align: center; color: var(--muted); font-size: 0.85em; }
  .chat-log { background: var(--card); border: 1px solid var(--border); border-radius: 8px; min-height: 320px; max-height: 420px; overflow-y: auto; padding: 14px; margin-bottom: 12px; }
  .msg { margin-bottom: 12px; font-size: 0.85em; line-height: 1.5; }
  .msg .who { font-weight: bold; color: var(--muted); font-size: 0.75em; text-transform: uppercase; }
  .msg.user .who { color: var(--accent); }
  .msg.assistant .who { color: var(--success); }
  .steps li { margin: 10px 0 10px 20px; font-size: 0.9em; line-height: 1.5; }
  h2.title { margin-bottom: 14px; }
  p.sub { color: var(--muted); font-size: 0.85em; margin-bottom: 18px; }
  .intel-bar { display: flex; align-items: center; gap: 10px; margin: 6px 0; font-size: 0.8em; }
  .intel-bar .bar { height: 10px; background: var(--accent); border-radius: 5px; }
  pre.intel { white-space: pre-wrap; word-break: break-word; color: var(--muted); font-size: 0.75em; margin-top: 4px; }
  footer { padding: 20px 30px; text-align: center; color: var(--muted); font-size: 0.75em; border-top: 1px solid var(--border); }
</style>
</head>
<body>
<div class="header">
  <h1>⛨ CYBERGUARD</h1>
  <div class="status"><span><span class="dot"></span>SYSTEM ACTIVE</span><span id="clock">--</span></div>
</div>

<nav id="nav">
  <button data-view="dashboard" class="active">Dashboard</button>
  <button data-view="website">Website Detection</button>
  <button data-view="audio">Audio Detection</button>
  <button data-view="intelligence">Threat Intelligence</button>
  <button data-view="recovery">Support &amp; Recovery</button>
  <button data-view="chat">Support Chat</button>
</nav>

<section id="view-dashboard" class="active">
  <h2 class="title">Welcome back, Guardian</h2>
  <p class="sub">Your integrated cyber safety command center is active and monitoring.</p>
  <div class="grid">
    <div class="card"><h3>Total Detections</h3><div class="value blue" id="stat-incidents">--</div></div>
    <div class="card"><h3>Website Flags</h3><div class="value yellow" id="stat-website">--</div></div>
    <div class="card"><h3>Audio Flags</h3><div class="value red" id="stat-audio">--</div></div>
    <div class="card"><h3>Honeypot Events</h3><div class="value green" id="stat-events">--</div></div>
  </div>
  <h2 class="title">Recent Activity</h2>
  <div class="list" id="recent-incidents"><div class="empty">No recent incidents detected. Your environment is safe.</div></div>
</section>

<section id="view-website">
  <h2 class="title">Fake Website Detection</h2>
  <p class="sub">Paste a suspicious URL; the AI engine scores its structure and known phishing patterns.</p>
  <div class="row">
    <input type="text" id="url-input" placeholder="https://example-bank-login.com">
    <button class="primary" id="url-analyze">Analyze</button>
  </div>
  <div class="notice" id="url-error"></div>
  <div class="result" id="url-result">
    <h2 id="url-status">--</h2>
    <div>Risk Score: <span id="url-score">--</span>/100</div>
    <div class="meter"><div class="fill" id="url-meter" style="width:0%"></div></div>
    <div id="url-persistence"></div>
    <h3 style="margin-top:14px">Key Findings</h3>
    <div id="url-reasons"></div>
    <p id="url-details" style="margin-top:10px; color: var(--muted); font-size: 0.85em;"></p>
  </div>
</section>

<section id="view-audio">
  <h2 class="title">Real-Time Call Guard</h2>
  <p class="sub">Paste or dictate a call transcript, then analyze it for manipulation, urgency, and fraud patterns.</p>
  <div class="row"><textarea id="transcript-input" placeholder="Transcript appears here..."></textarea></div>
  <div class="row">
    <button class="ghost" id="record-toggle">● Record</button>
    <button class="primary" id="audio-analyze">Analyze Call Security</button>
  </div>
  <div class="notice" id="audio-error"></div>
  <div class="result" id="audio-result">
    <h2 id="audio-headline">--</h2>
    <div>Confidence Level: <span id="audio-score">--</span>%</div>
    <div class="meter"><div class="fill" id="audio-meter" style="width:0%"></div></div>
    <div id="audio-persistence"></div>
    <h3 style="margin-top:14px">Detected Risk Indicators</h3>
    <div id="audio-alerts"></div>
    <p id="audio-explanation" style="margin-top:10px; color: var(--muted); font-size: 0.85em;"></p>
  </div>
</section>

<section id="view-intelligence">
  <h2 class="title">Threat Intel &amp; Honeypot</h2>
  <p class="sub">Aggregate scam patterns extracted from flagged interactions.</p>
  <div class="row"><button class="ghost" id="intel-refresh">Refresh Feed</button></div>
  <div class="card" style="margin-bottom:16px"><h3>Events by Scam Type</h3><div id="intel-types"><div class="empty">No data yet.</div></div></div>
  <h2 class="title">Honeypot Live Logs</h2>
  <div class="list" id="intel-log"><div class="empty">No honeypot events recorded.</div></div>
</section>

<section id="view-recovery">
  <h2 class="title">Support &amp; Recovery</h2>
  <p class="sub">If you suspect you have been targeted, work through these steps in order.</p>
  <div class="card">
    <ol class="steps">
      <li><b>Stop contact.</b> End the call, close the page, do not reply to follow-up messages.</li>
      <li><b>Secure your money.</b> Call your bank's fraud line and freeze any card or account you shared details for.</li>
      <li><b>Change credentials.</b> Update passwords for any account entered on a suspicious page; enable two-factor authentication.</li>
      <li><b>Preserve evidence.</b> Keep screenshots, URLs, phone numbers, and this dashboard's incident records.</li>
      <li><b>Report it.</b> File a report with your national cybercrime portal or local police; forward phishing to your provider.</li>
      <li><b>Ask for help.</b> Use the Support Chat for step-by-step guidance; if you are in immediate distress, contact your nearest police station or official helpline.</li>
    </ol>
  </div>
</section>

<section id="view-chat">
  <h2 class="title">Support Chat</h2>
  <p class="sub">CyberGuard Support — calm, practical guidance for cybercrime victims.</p>
  <div class="chat-log" id="chat-log"><div class="empty">Say hello to start.</div></div>
  <div class="row">
    <input type="text" id="chat-input" placeholder="Describe what happened...">
    <button class="primary" id="chat-send">Send</button>
  </div>
  <div class="notice" id="chat-error"></div>
</section>

<footer>CyberGuard — analysis by an external AI gateway; verdicts are advisory, not legal or financial advice.</footer>

<script>
const $ = (id) => document.getElementById(id);
let chatHistory = [];

// ── Navigation ──
document.querySelectorAll('#nav button').forEach(btn => {
  btn.addEventListener('click', () => {
    document.querySelectorAll('#nav button').forEach(b => b.classList.remove('active'));
    document.querySelectorAll('section').forEach(s => s.classList.remove('active'));
    btn.classList.add('active');
    $('view-' + btn.dataset.view).classList.add('active');
    if (btn.dataset.view === 'dashboard') refreshDashboard();
    if (btn.dataset.view === 'intelligence') refreshIntel();
  });
});

async function getJson(url) {
  const res = await fetch(url);
  if (!res.ok) throw new Error('HTTP ' + res.status);
  return res.json();
}

async function postJson(url, body) {
  const res = await fetch(url, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body),
  });
  const data = await res.json().catch(() => ({}));
  if (!res.ok) throw new Error(data.error || ('HTTP ' + res.status));
  return data;
}

// ── Dashboard ──
async function refreshDashboard() {
  try {
    const stats = await getJson('/api/stats');
    $('stat-incidents').textContent = stats.incidents;
    $('stat-website').textContent = stats.website_incidents;
    $('stat-audio').textContent = stats.audio_incidents;
    $('stat-events').textContent = stats.honeypot_events;
  } catch (e) { /* degraded: tiles keep their last value */ }
  try {
    const incidents = await getJson('/api/incidents');
    const list = $('recent-incidents');
    if (!incidents.length) {
      list.innerHTML = '<div class="empty">No recent incidents detected. Your environment is safe.</div>';
      return;
    }
    list.innerHTML = incidents.slice(0, 8).map(i => `
      <div class="item">
        <span class="kind ${i.type}">${i.type}</span>
        <span>${escapeHtml(i.target)}</span>
        <span>${i.riskScore}/100</span>
        <span>${new Date(i.timestamp).toLocaleString()}</span>
      </div>`).join('');
  } catch (e) { /* degraded: keep last list */ }
}

// ── Website detection ──
$('url-analyze').addEventListener('click', async () => {
  const url = $('url-input').value.trim();
  if (!url) return;
  setBusy('url-analyze', true, 'Analyzing...');
  hide('url-error'); hide('url-result');
  try {
    const data = await postJson('/api/analyze/website', { url });
    const v = data.verdict;
    const flagged = v.status !== 'Safe';
    const result = $('url-result');
    result.className = 'result ' + (flagged ? 'flagged' : 'safe');
    result.style.display = 'block';
    $('url-status').textContent = 'Result: ' + v.status;
    $('url-score').textContent = v.riskScore;
    $('url-meter').style.width = v.riskScore + '%';
    $('url-persistence').innerHTML = persistenceBadge(data.persistence);
    $('url-reasons').innerHTML = v.reasons.map(r => `<span class="badge reason">${escapeHtml(r)}</span>`).join('') || '<span class="badge reason">none</span>';
    $('url-details').textContent = v.details;
    refreshDashboard();
  } catch (e) {
    showError('url-error', 'Analysis failed: ' + e.message);
  } finally {
    setBusy('url-analyze', false, 'Analyze');
  }
});

// ── Audio detection ──
$('audio-analyze').addEventListener('click', async () => {
  const transcript = $('transcript-input').value.trim();
  if (!transcript) return;
  setBusy('audio-analyze', true, 'Analyzing...');
  hide('audio-error'); hide('audio-result');
  try {
    const data = await postJson('/api/analyze/audio', { transcript });
    const v = data.verdict;
    const result = $('audio-result');
    result.className = 'result ' + (v.isScam ? 'flagged' : 'safe');
    result.style.display = 'block';
    $('audio-headline').textContent = v.isScam ? 'SCAM DETECTED' : 'SECURE CALL';
    $('audio-score').textContent = v.scamProbability;
    $('audio-meter').style.width = v.scamProbability + '%';
    $('audio-persistence').innerHTML = persistenceBadge(data.persistence);
    $('audio-alerts').innerHTML = v.alerts.map(a => `<span class="badge reason">${escapeHtml(a)}</span>`).join('') || '<span class="badge reason">none</span>';
    $('audio-explanation').textContent = v.explanation;
    refreshDashboard();
  } catch (e) {
    showError('audio-error', 'Analysis failed: ' + e.message);
  } finally {
    setBusy('audio-analyze', false, 'Analyze Call Security');
  }
});

// Live capture is a browser capability; transcripts feed the same analyze flow
let recognition = null, recording = false;
$('record-toggle').addEventListener('click', () => {
  const Speech = window.SpeechRecognition || window.webkitSpeechRecognition;
  if (!Speech) { showError('audio-error', 'Speech recognition is not available in this browser; paste a transcript instead.'); return; }
  if (recording) { recognition.stop(); return; }
  recognition = new Speech();
  recognition.continuous = true;
  recognition.interimResults = false;
  recognition.lang = 'en-US';
  recognition.onresult = (event) => {
    for (let i = event.resultIndex; i < event.results.length; ++i) {
      if (event.results[i].isFinal) $('transcript-input').value += event.results[i][0].transcript;
    }
  };
  recognition.onend = () => { recording = false; $('record-toggle').textContent = '● Record'; };
  recognition.onerror = () => { recording = false; $('record-toggle').textContent = '● Record'; };
  recognition.start();
  recording = true;
  $('record-toggle').textContent = '■ Stop';
});

// ── Threat intelligence ──
async function refreshIntel() {
  try {
    const events = await getJson('/api/honeypot');
    const counts = {};
    events.forEach(e => { counts[e.scam_type] = (counts[e.scam_type] || 0) + 1; });
    const types = $('intel-types');
    const entries = Object.entries(counts);
    types.innerHTML = entries.length
      ? entries.map(([type, n]) => `
          <div class="intel-bar"><span style="width:110px">${escapeHtml(type)}</span>
          <div class="bar" style="width:${Math.min(100, n * 12)}px"></div><span>${n}</span></div>`).join('')
      : '<div class="empty">No data yet.</div>';
    const log = $('intel-log');
    log.innerHTML = events.length
      ? events.map(e => `
          <div class="item" style="grid-template-columns: 120px 1fr 170px">
            <span class="kind website">${escapeHtml(e.scam_type)}</span>
            <pre class="intel">${escapeHtml(JSON.stringify(e.intel_extracted))}</pre>
            <span>${new Date(e.timestamp).toLocaleString()}</span>
          </div>`).join('')
      : '<div class="empty">No honeypot events recorded.</div>';
  } catch (e) { /* degraded: keep last feed */ }
}
$('intel-refresh').addEventListener('click', refreshIntel);

// ── Support chat ──
$('chat-send').addEventListener('click', sendChat);
$('chat-input').addEventListener('keydown', (e) => { if (e.key === 'Enter') sendChat(); });

async function sendChat() {
  const message = $('chat-input').value.trim();
  if (!message) return;
  $('chat-input').value = '';
  hide('chat-error');
  appendChat('user', message);
  setBusy('chat-send', true, '...');
  try {
    const data = await postJson('/api/chat', { message, history: chatHistory });
    chatHistory.push({ role: 'user', content: message });
    chatHistory.push({ role: 'assistant', content: data.content });
    appendChat('assistant', data.content);
  } catch (e) {
    showError('chat-error', 'Support chat unavailable: ' + e.message);
  } finally {
    setBusy('chat-send', false, 'Send');
  }
}

function appendChat(role, content) {
  const log = $('chat-log');
  const empty = log.querySelector('.empty');
  if (empty) empty.remove();
  const div = document.createElement('div');
  div.className = 'msg ' + role;
  div.innerHTML = `<div class="who">${role === 'user' ? 'You' : 'CyberGuard Support'}</div>${escapeHtml(content)}`;
  log.appendChild(div);
  log.scrollTop = log.scrollHeight;
}

// ── Helpers ──
function persistenceBadge(p) {
  if (!p || p.state === 'not_flagged') return '';
  if (p.state === 'committed') return '<span class="badge saved">RECORDED</span>';
  return '<span class="badge unsaved">NOT SAVED — ' + escapeHtml(p.error || 'storage unavailable') + '</span>';
}
function setBusy(id, busy, label) { const b = $(id); b.disabled = busy; b.textContent = label; }
function showError(id, message) { const n = $(id); n.textContent = message; n.style.display = 'block'; }
function hide(id) { $(id).style.display = 'none'; }
function escapeHtml(s) {
  return String(s).replace(/[&<>"']/g, c => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' }[c]));
}

setInterval(() => { $('clock').textContent = new Date().toLocaleTimeString(); }, 1000);
refreshDashboard();
</script>
</body>
</html>
"#;
