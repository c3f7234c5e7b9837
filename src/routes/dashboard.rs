use axum::{
    http::header,
    response::{Html, IntoResponse},
};

pub async fn dashboard() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "public, max-age=60")],
        Html(DASHBOARD_HTML),
    )
}

const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>SMAAWA Water Monitoring</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <style>
        :root {
            --bg: #f8fafc;
            --surface: #ffffff;
            --border: #e2e8f0;
            --text: #1e293b;
            --muted: #64748b;
            --accent: #3b82f6;
            --rate: #f97316;
            --good: #10b981;
            --warn: #fbbf24;
            --bad: #ef4444;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body { font-family: system-ui, -apple-system, sans-serif; background: var(--bg); color: var(--text); }
        .container { max-width: 1200px; margin: 0 auto; padding: 1.5rem; }
        header { display: flex; justify-content: space-between; align-items: center; gap: 1rem; flex-wrap: wrap; margin-bottom: 1rem; }
        h1 { font-size: 1.25rem; font-weight: 600; }
        .status { display: flex; align-items: center; gap: 0.5rem; font-size: 0.875rem; }
        .dot { width: 10px; height: 10px; border-radius: 50%; background: var(--muted); }
        .dot.online { background: var(--good); }
        .dot.error { background: var(--bad); }
        .controls { display: flex; gap: 0.5rem; flex-wrap: wrap; align-items: center; margin-bottom: 1rem; }
        button, select, input { padding: 0.4rem 0.8rem; border: 1px solid var(--border); border-radius: 0.375rem; background: var(--surface); font-size: 0.875rem; }
        button.active { background: var(--accent); color: white; border-color: var(--accent); }
        .cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 0.75rem; margin-bottom: 1rem; }
        .card { background: var(--surface); border: 1px solid var(--border); border-radius: 0.5rem; padding: 1rem; }
        .card .label { font-size: 0.75rem; color: var(--muted); }
        .card .value { font-size: 1.5rem; font-weight: 600; }
        .battery-bar { height: 6px; border-radius: 3px; background: var(--border); margin-top: 0.5rem; overflow: hidden; }
        .battery-fill { height: 100%; }
        .charts { display: grid; grid-template-columns: 1fr; gap: 0.75rem; }
        .chart-box { background: var(--surface); border: 1px solid var(--border); border-radius: 0.5rem; padding: 1rem; height: 300px; }
        .location { background: var(--surface); border: 1px solid var(--border); border-radius: 0.5rem; padding: 1rem; margin-top: 1rem; }
        .location form { display: flex; gap: 0.5rem; flex-wrap: wrap; margin-bottom: 0.75rem; }
        #map { height: 320px; border-radius: 0.375rem; }
        .error-text { color: var(--bad); font-size: 0.8rem; }
    </style>
</head>
<body>
<div class="container">
    <header>
        <h1>SMAAWA Water Monitoring</h1>
        <div class="status">
            <span id="api-dot" class="dot"></span>
            <span id="api-text">Connecting...</span>
            <span>&middot; Last update: <span id="last-update">-</span></span>
            <span>&middot; Next refresh: <span id="countdown">-</span></span>
        </div>
    </header>

    <div class="controls">
        <select id="device-select"></select>
        <span id="fleet"></span>
        <button id="refresh-btn">Refresh Now</button>
        <button id="auto-btn">Pause Auto-Refresh</button>
        <span style="flex:1"></span>
        <button class="range-btn" data-mode="realtime">Real-Time</button>
        <button class="range-btn" data-mode="hourly" data-hours="1">1H</button>
        <button class="range-btn" data-mode="hourly" data-hours="24">24H</button>
        <button class="range-btn" data-mode="hourly" data-hours="168">7D</button>
    </div>

    <div class="cards">
        <div class="card"><div class="label">Water Level (cm)</div><div class="value" id="level">-</div></div>
        <div class="card"><div class="label">Rate (cm/hr)</div><div class="value" id="rate">-</div><div class="label" id="trend"></div></div>
        <div class="card"><div class="label">Battery (%)</div><div class="value" id="battery">-</div>
            <div class="battery-bar"><div class="battery-fill" id="battery-fill"></div></div></div>
        <div class="card"><div class="label">Min / Max (1h)</div><div class="value" id="minmax">-</div></div>
        <div class="card"><div class="label">Avg Rate (1h, cm/hr)</div><div class="value" id="avg-rate">-</div></div>
        <div class="card"><div class="label">Data Points (1h)</div><div class="value" id="points">-</div></div>
        <div class="card"><div class="label">Last Seen</div><div class="value" id="last-seen">-</div></div>
        <div class="card"><div class="label">Uptime</div><div class="value" id="uptime">-</div></div>
    </div>

    <div class="charts">
        <div class="chart-box"><canvas id="level-chart"></canvas></div>
        <div class="chart-box"><canvas id="rate-chart"></canvas></div>
    </div>

    <div class="location">
        <form id="location-form">
            <input id="loc-name" placeholder="Location name">
            <input id="loc-lat" placeholder="Latitude">
            <input id="loc-lng" placeholder="Longitude">
            <button type="submit">Save Location</button>
            <span id="loc-error" class="error-text"></span>
        </form>
        <p class="label">Location: <span id="loc-current">Not set</span></p>
        <div id="map"></div>
    </div>
</div>

<script>
const BATTERY_COLORS = { good: '#10b981', fair: '#fbbf24', critical: '#ef4444' };
let levelChart = null;
let rateChart = null;
let map = null;
let marker = null;
let renderedDevice = null;

async function api(method, path, body) {
    const res = await fetch(path, {
        method,
        headers: body ? { 'Content-Type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined,
    });
    const data = await res.json();
    if (!res.ok) throw new Error(data.error || res.statusText);
    return data;
}

function makeChart(canvas, label, color, yTitle) {
    return new Chart(canvas, {
        type: 'line',
        data: { labels: [], datasets: [{ label, data: [], borderColor: color, backgroundColor: color,
            borderWidth: 2, tension: 0.4, fill: false, spanGaps: false }] },
        options: { responsive: true, maintainAspectRatio: false, animation: false,
            scales: { y: { title: { display: true, text: yTitle } }, x: { title: { display: true, text: 'Time' } } } },
    });
}

function setChart(chart, kind, labels, values) {
    chart.config.type = kind;
    chart.data.labels = labels;
    chart.data.datasets[0].data = values;
    chart.update();
}

function renderDevices(state) {
    const select = document.getElementById('device-select');
    const current = state.current_device;
    select.innerHTML = '';
    for (const device of state.devices) {
        const option = document.createElement('option');
        option.value = device.device_id;
        option.textContent = (device.liveness === 'online' ? '\u{1F7E2} ' : '\u{1F7E1} ') + device.label;
        select.appendChild(option);
    }
    if (current) select.value = current;
    document.getElementById('fleet').textContent =
        `${state.fleet.online}/${state.fleet.total} online, ${state.fleet.offline} offline`;
}

function render(state) {
    initMap(state.map);
    const dot = document.getElementById('api-dot');
    dot.className = 'dot ' + state.api_status.status;
    document.getElementById('api-text').textContent = state.api_status.text;
    document.getElementById('last-update').textContent = state.last_update_text || '-';
    document.getElementById('countdown').textContent =
        state.refresh.auto_refresh ? `${state.refresh.seconds_until_refresh}s` : 'paused';
    document.getElementById('auto-btn').textContent =
        state.refresh.auto_refresh ? 'Pause Auto-Refresh' : 'Resume Auto-Refresh';

    if (document.activeElement !== document.getElementById('device-select')) renderDevices(state);

    const latest = state.latest;
    if (latest) {
        document.getElementById('level').textContent = latest.water_level_display;
        document.getElementById('rate').textContent = latest.rate_display;
        document.getElementById('trend').textContent = latest.rate_trend;
        document.getElementById('battery').textContent = latest.battery_percent;
        const fill = document.getElementById('battery-fill');
        fill.style.width = `${Math.max(0, Math.min(100, latest.battery_percent))}%`;
        fill.style.background = BATTERY_COLORS[latest.battery_band];
        document.getElementById('last-seen').textContent = latest.last_seen_text;
        document.getElementById('uptime').textContent = `${latest.uptime_percent.toFixed(1)}%`;
    }

    const metrics = state.window;
    if (metrics) {
        document.getElementById('points').textContent = metrics.data_points;
        if (metrics.min_level !== null) {
            document.getElementById('minmax').textContent =
                `${metrics.min_level.toFixed(1)} / ${metrics.max_level.toFixed(1)}`;
            document.getElementById('avg-rate').textContent = metrics.avg_rate_per_hour.toFixed(2);
        }
    }

    for (const btn of document.querySelectorAll('.range-btn')) {
        const range = state.chart_range;
        const active = btn.dataset.mode === range.mode &&
            (range.mode === 'realtime' || Number(btn.dataset.hours) === range.hours);
        btn.classList.toggle('active', active);
    }

    if (state.chart) {
        const s = state.chart.series;
        setChart(levelChart, state.chart.kind, s.labels, s.levels);
        setChart(rateChart, state.chart.kind, s.labels, s.rates);
    }

    if (state.current_device !== renderedDevice) {
        renderedDevice = state.current_device;
        loadLocation(renderedDevice);
    }
}

async function poll() {
    try {
        render(await api('GET', '/api/state'));
    } catch (e) {
        document.getElementById('api-dot').className = 'dot error';
        document.getElementById('api-text').textContent = 'Error';
    }
}

function initMap(defaults) {
    if (map) return;
    map = L.map('map').setView([defaults.lat, defaults.lng], defaults.zoom);
    L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
        attribution: '&copy; OpenStreetMap contributors'
    }).addTo(map);
}

function clearMarker() {
    if (marker) map.removeLayer(marker);
    marker = null;
}

async function showMap(deviceId) {
    const view = await api('GET', `/api/locations/${encodeURIComponent(deviceId)}/map`);
    const pos = [view.location.lat, view.location.lng];
    map.setView(pos, view.zoom);
    clearMarker();
    let popup = `<b>${view.device_id}</b><br>${view.name}`;
    if (view.reading) {
        const r = view.reading;
        popup += `<hr>${r.measured_at || ''}<br>Water Level: ${r.water_level_display} cm` +
            `<br>Rate: ${r.rate_display} cm/hr<br>Battery: ${r.battery_percent}%`;
    }
    marker = L.marker(pos).addTo(map);
    marker.bindPopup(popup).openPopup();
}

async function loadLocation(deviceId) {
    document.getElementById('loc-error').textContent = '';
    if (!deviceId) return;
    try {
        const loc = await api('GET', `/api/locations/${encodeURIComponent(deviceId)}`);
        document.getElementById('loc-name').value = loc.name;
        document.getElementById('loc-lat').value = loc.lat;
        document.getElementById('loc-lng').value = loc.lng;
        document.getElementById('loc-current').textContent = loc.name || 'Not set';
        await showMap(deviceId);
    } catch (e) {
        for (const id of ['loc-name', 'loc-lat', 'loc-lng']) document.getElementById(id).value = '';
        document.getElementById('loc-current').textContent = 'Not set';
        clearMarker();
    }
}

document.getElementById('device-select').addEventListener('change', async (e) => {
    render(await api('PUT', '/api/selection', { device_id: e.target.value }));
});
document.getElementById('refresh-btn').addEventListener('click', async () => {
    render(await api('POST', '/api/refresh'));
});
document.getElementById('auto-btn').addEventListener('click', async () => {
    await api('POST', '/api/auto-refresh');
    poll();
});
for (const btn of document.querySelectorAll('.range-btn')) {
    btn.addEventListener('click', async () => {
        const range = btn.dataset.mode === 'realtime'
            ? { mode: 'realtime' }
            : { mode: 'hourly', hours: Number(btn.dataset.hours) };
        render(await api('PUT', '/api/chart/range', range));
    });
}
document.getElementById('location-form').addEventListener('submit', async (e) => {
    e.preventDefault();
    const deviceId = document.getElementById('device-select').value;
    try {
        await api('PUT', `/api/locations/${encodeURIComponent(deviceId || ' ')}`, {
            name: document.getElementById('loc-name').value,
            lat: document.getElementById('loc-lat').value,
            lng: document.getElementById('loc-lng').value,
        });
        document.getElementById('loc-error').textContent = '';
        document.getElementById('loc-current').textContent =
            document.getElementById('loc-name').value.trim() || 'Not set';
        await showMap(deviceId);
    } catch (err) {
        document.getElementById('loc-error').textContent = err.message;
    }
});

levelChart = makeChart(document.getElementById('level-chart'), 'Water Level (cm)', '#3b82f6', 'Depth (cm)');
rateChart = makeChart(document.getElementById('rate-chart'), 'Charge/Discharge Rate (cm/hr)', '#f97316', 'Rate (cm/hr)');
poll();
setInterval(poll, 2000);
</script>
</body>
</html>
"##;
