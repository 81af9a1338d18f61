/// Test fixtures: small synthetic raw transect and discharge-log files.
///
/// The raw fixtures follow the XYZ-frame .T block layout documented in
/// `ingest::tfile`: 6 header rows then one 13-column row per depth bin,
/// velocities in cm/s. Positions run due east along the equator so the
/// transect bearing is exactly 90°, and the ADP heading is 90° with a
/// relative water direction of 0°, so water flows along the transect line.
///
/// The discharge-log fixtures use the default column names from
/// `config::DischargeLogColumns`, 5 leading metadata rows and 15 footer rows.

/// Two profiles × three bins, bin spacing 1 m, all flags good.
///
/// Cumulative distance made good: 10 m, then 15 m.
#[cfg(test)]
pub(crate) fn fixture_two_profile_tfile() -> &'static str {
    "2019 7 16 14 30 0 0 0 0 0 0 90.0
0 0 0 0 0 0 0 0 2.0 2.2 2.4
0 0 0 0 10.0
0.0 0.0 2
0
3
0.5 20.0 0.0 10.0 -5.0 1.0 0 0 0 0 0 0 10
1.5 30.0 0.0 15.0 -7.5 1.5 0 0 0 0 0 0 10
2.5 40.0 0.0 20.0 -10.0 2.0 0 0 0 0 0 0 10
2019 7 16 14 30 2 0 0 0 0 0 90.0
0 0 0 0 0 0 0 0 2.0 2.2 2.4
0 0 0 0 15.0
0.0 0.001 2
0
3
0.5 22.0 0.0 11.0 -5.5 1.1 0 0 0 0 0 0 10
1.5 32.0 0.0 16.0 -8.0 1.6 0 0 0 0 0 0 10
2.5 42.0 0.0 21.0 -10.5 2.1 0 0 0 0 0 0 10
"
}

/// One profile with five bins, to check the block length is taken from
/// the header rather than assumed.
#[cfg(test)]
pub(crate) fn fixture_five_bin_tfile() -> &'static str {
    "2020 3 1 9 0 0 0 0 0 0 0 45.0
0 0 0 0 0 0 0 0 5.0 5.0 5.0
0 0 0 0 0.0
41.5 -89.5 1
0
5
0.5 10.0 30.0 5.0 5.0 0.0 0 0 0 0 0 0 5
1.0 10.0 30.0 5.0 5.0 0.0 0 0 0 0 0 0 5
1.5 10.0 30.0 5.0 5.0 0.0 0 0 0 0 0 0 5
2.0 10.0 30.0 5.0 5.0 0.0 0 0 0 0 0 0 5
2.5 10.0 30.0 5.0 5.0 0.0 0 0 0 0 0 0 5
"
}

/// Two profiles × three bins with quality flags exercising the masking
/// rule. Profile 1: flags 150 (first bin, exempt), 150 (masked), 50 (kept).
/// Profile 2: flags 10, 101 (masked), 100 (kept, not strictly above).
#[cfg(test)]
pub(crate) fn fixture_flagged_tfile() -> &'static str {
    "2019 7 16 14 30 0 0 0 0 0 0 90.0
0 0 0 0 0 0 0 0 2.0 2.2 2.4
0 0 0 0 10.0
0.0 0.0 2
0
3
0.5 20.0 0.0 10.0 -5.0 1.0 0 0 0 0 0 0 150
1.5 30.0 0.0 15.0 -7.5 1.5 0 0 0 0 0 0 150
2.5 40.0 0.0 20.0 -10.0 2.0 0 0 0 0 0 0 50
2019 7 16 14 30 2 0 0 0 0 0 90.0
0 0 0 0 0 0 0 0 2.0 2.2 2.4
0 0 0 0 15.0
0.0 0.001 2
0
3
0.5 22.0 0.0 11.0 -5.5 1.1 0 0 0 0 0 0 10
1.5 32.0 0.0 16.0 -8.0 1.6 0 0 0 0 0 0 101
2.5 42.0 0.0 21.0 -10.5 2.1 0 0 0 0 0 0 100
"
}

/// Discharge log for the two-profile transect: zero vessel motion, both
/// profiles good (DQI 1), plus a third profile with DQI 4 that must be
/// dropped.
#[cfg(test)]
pub(crate) fn fixture_discharge_log() -> &'static str {
    "RiverSurveyor discharge summary
Site Name,Test Reach
Station Number,0001
Operator,QA
System Type,M9
Profile,Date,Time,DQI,Lat(deg),Long(deg),AvDepth(m),uFlow(m/s),DirFlow(deg),Q(m^3/s),uVess(m/s),DirVess(deg),Depth(m),Width(m)
1,2019/07/16,14:30:00,1,0.0,0.0,2.2,0.30,90.0,1.5,0.0,0.0,2.0,1.0
2,2019/07/16,14:30:02,1,0.0,0.001,2.4,0.32,92.0,1.7,0.0,0.0,3.0,2.0
3,2019/07/16,14:30:04,4,0.0,0.002,9.9,9.90,99.0,9.9,9.9,99.0,9.0,9.0
Summary
Total Q,3.2
Left Q,0.0
Right Q,0.0
Top Q,0.0
Bottom Q,0.0
Measured Q,3.2
Width,3.0
Area,5.0
Mean Velocity,0.31
Max Depth,2.4
Start Bank,Left
Duration,4
Track,Bottom
Depth Ref,VB
"
}

/// Discharge log with vessel motion, covering only profile 2 of the
/// two-profile transect. The vessel crosses at 1 m/s heading 90° relative
/// to the instrument.
#[cfg(test)]
pub(crate) fn fixture_moving_vessel_log() -> &'static str {
    "RiverSurveyor discharge summary
Site Name,Test Reach
Station Number,0001
Operator,QA
System Type,M9
Profile,Date,Time,DQI,Lat(deg),Long(deg),AvDepth(m),uFlow(m/s),DirFlow(deg),Q(m^3/s),uVess(m/s),DirVess(deg),Depth(m),Width(m)
2,2019/07/16,14:30:02,2,0.0,0.001,2.4,0.32,92.0,1.7,1.0,90.0,3.0,2.0
Summary
Total Q,1.7
Left Q,0.0
Right Q,0.0
Top Q,0.0
Bottom Q,0.0
Measured Q,1.7
Width,2.0
Area,6.0
Mean Velocity,0.32
Max Depth,2.4
Start Bank,Left
Duration,2
Track,Bottom
Depth Ref,VB
"
}

/// Returns `text` with its `n`th line (0-based) replaced.
#[cfg(test)]
pub(crate) fn replace_nth_line(text: &str, n: usize, replacement: &str) -> String {
    text.lines()
        .enumerate()
        .map(|(i, line)| if i == n { replacement } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}
