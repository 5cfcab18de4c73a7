// History backfill - Initial population of both series windows
use crate::application::platform_client::{KeyedSamples, PlatformClient, PlatformError, TELEMETRY_KEYS};
use crate::domain::telemetry::{
    ChartPoint, MeasuredValues, PredictedValues, SeriesBuffer, TelemetrySample,
};
use chrono::Utc;
use std::time::Duration;

/// Look-back window fetched when the dashboard starts.
pub const HISTORY_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Fetch the look-back window for all tracked keys and build the initial
/// measured and predicted series.
pub async fn load_history(
    client: &dyn PlatformClient,
    token: &str,
    device_id: &str,
) -> Result<(SeriesBuffer, SeriesBuffer), PlatformError> {
    let end_ts = Utc::now().timestamp_millis();
    let start_ts = end_ts - HISTORY_WINDOW.as_millis() as i64;

    let mut series = client
        .fetch_timeseries_range(token, device_id, &TELEMETRY_KEYS, start_ts, end_ts)
        .await?;

    let temps = take_key(&mut series, "temperature");
    let hums = take_key(&mut series, "humidity");
    let lights = take_key(&mut series, "light");
    let ptemps = take_key(&mut series, "predicted_temp");
    let phums = take_key(&mut series, "predicted_humid");

    let measured = SeriesBuffer::from_history(zip_measured(&temps, &hums, &lights));
    let predicted = SeriesBuffer::from_history(zip_predicted(&ptemps, &phums));

    tracing::info!(
        measured = measured.len(),
        predicted = predicted.len(),
        "history backfill complete"
    );

    Ok((measured, predicted))
}

fn take_key(series: &mut KeyedSamples, key: &str) -> Vec<TelemetrySample> {
    series.remove(key).unwrap_or_default()
}

/// Pair temperature, humidity and light samples by array index, anchored on
/// the temperature array. This assumes the platform returns equal-length,
/// equal-cadence arrays for co-sampled keys; a missing i-th partner reads
/// as 0. Pairing by matching timestamp would tolerate misaligned arrays.
pub fn zip_measured(
    temps: &[TelemetrySample],
    hums: &[TelemetrySample],
    lights: &[TelemetrySample],
) -> Vec<ChartPoint> {
    temps
        .iter()
        .enumerate()
        .map(|(i, t)| {
            ChartPoint::measured(
                t.ts,
                MeasuredValues {
                    temperature: t.value_f64(),
                    humidity: hums.get(i).map(TelemetrySample::value_f64).unwrap_or(0.0),
                    light: lights.get(i).map(TelemetrySample::value_f64).unwrap_or(0.0),
                },
            )
        })
        .collect()
}

/// Index-paired predicted points, anchored on the predicted-temperature
/// array. Same alignment assumption as `zip_measured`.
pub fn zip_predicted(ptemps: &[TelemetrySample], phums: &[TelemetrySample]) -> Vec<ChartPoint> {
    ptemps
        .iter()
        .enumerate()
        .map(|(i, t)| {
            ChartPoint::predicted(
                t.ts,
                PredictedValues {
                    temperature: t.value_f64(),
                    humidity: phums.get(i).map(TelemetrySample::value_f64).unwrap_or(0.0),
                },
            )
        })
        .collect()
}
