//! Compound Filter Scan Demo
//!
//! Builds an in-memory columnar segment and runs compound filter scans
//! over it, showing:
//! - AND / OR trees with short-circuit evaluation
//! - Evaluation-order overrides
//! - Offset-input (random access) evaluation

use std::sync::Arc;

use sift::{
    ColumnData, ColumnInfo, CompareExpression, ComparisonType, ConjunctionExpression,
    ConjunctionType, FilterExecutor, FilterExpressionRef, InListExpression, LogicalType, Segment,
    SiftResult, Value,
};

const ROWS: usize = 1000;
const BATCH: usize = 64;
const REGIONS: [&str; 4] = ["north", "south", "east", "west"];

fn main() -> SiftResult<()> {
    println!("🔷 Sift Compound Filter Demo");
    println!("============================\n");

    let segment = build_segment()?;
    println!(
        "✅ Built segment: {} rows, {} columns\n",
        segment.row_count(),
        segment.column_count()
    );

    conjunction_scan(&segment)?;
    disjunction_scan(&segment)?;
    reordered_scan(&segment)?;
    offset_scan(&segment)?;

    println!("\n✅ Demo complete");
    Ok(())
}

fn build_segment() -> SiftResult<Arc<Segment>> {
    let mut segment = Segment::new();
    segment.add_column(
        ColumnInfo::new("id", LogicalType::Integer),
        ColumnData::Integer((0..ROWS as i32).collect()),
    )?;
    segment.add_column(
        ColumnInfo::new("amount", LogicalType::Double),
        ColumnData::Double((0..ROWS).map(|i| ((i * 7) % 100) as f64 + 0.25).collect()),
    )?;
    segment.add_column(
        ColumnInfo::new("region", LogicalType::Varchar),
        ColumnData::Varchar((0..ROWS).map(|i| REGIONS[i % 4].to_string()).collect()),
    )?;
    segment.add_column(
        ColumnInfo::new("priority", LogicalType::Integer),
        ColumnData::Integer((0..ROWS).map(|i| (i % 5) as i32).collect()),
    )?;
    Ok(Arc::new(segment))
}

fn compare(
    segment: &Arc<Segment>,
    column: &str,
    comparison_type: ComparisonType,
    value: Value,
) -> SiftResult<FilterExpressionRef> {
    Ok(Box::new(CompareExpression::new(
        segment.clone(),
        column,
        comparison_type,
        value,
        BATCH,
    )?))
}

fn report(label: &str, executor: &mut FilterExecutor) -> SiftResult<()> {
    println!("📊 {}", label);
    println!("   filter: {}", executor.describe());
    let selection = executor.execute()?;
    let preview: Vec<usize> = selection.as_slice().iter().take(8).copied().collect();
    println!(
        "   selected {} rows, first {:?}\n",
        selection.count(),
        preview
    );
    Ok(())
}

fn conjunction_scan(segment: &Arc<Segment>) -> SiftResult<()> {
    let root = ConjunctionExpression::new(
        vec![
            compare(
                segment,
                "amount",
                ComparisonType::GreaterThanOrEqual,
                Value::double(25.0),
            )?,
            Box::new(InListExpression::new(
                segment.clone(),
                "region",
                vec![Value::varchar("east"), Value::varchar("west")],
                false,
                BATCH,
            )?),
        ],
        ConjunctionType::And,
    )?;
    let mut executor = FilterExecutor::new(segment.clone(), Box::new(root), BATCH)?;
    report("AND scan", &mut executor)
}

fn disjunction_scan(segment: &Arc<Segment>) -> SiftResult<()> {
    let root = ConjunctionExpression::new(
        vec![
            compare(segment, "priority", ComparisonType::Equal, Value::integer(0))?,
            compare(segment, "amount", ComparisonType::LessThan, Value::double(5.0))?,
        ],
        ConjunctionType::Or,
    )?;
    let mut executor = FilterExecutor::new(segment.clone(), Box::new(root), BATCH)?;
    report("OR scan", &mut executor)
}

fn reordered_scan(segment: &Arc<Segment>) -> SiftResult<()> {
    // Same AND tree, but the cheap in-list child runs first.
    let mut root = ConjunctionExpression::new(
        vec![
            compare(
                segment,
                "amount",
                ComparisonType::GreaterThanOrEqual,
                Value::double(25.0),
            )?,
            Box::new(InListExpression::new(
                segment.clone(),
                "region",
                vec![Value::varchar("east"), Value::varchar("west")],
                false,
                BATCH,
            )?),
        ],
        ConjunctionType::And,
    )?;
    root.set_evaluation_order(vec![1, 0])?;
    let mut executor = FilterExecutor::new(segment.clone(), Box::new(root), BATCH)?;
    report("AND scan, reordered", &mut executor)
}

fn offset_scan(segment: &Arc<Segment>) -> SiftResult<()> {
    let root = compare(segment, "region", ComparisonType::Like, Value::varchar("%th"))?;
    let mut executor = FilterExecutor::new(segment.clone(), root, BATCH)?;

    let offsets: Vec<usize> = (0..ROWS).step_by(97).collect();
    println!("🔎 Offset scan over {} sampled rows", offsets.len());
    println!("   filter: {}", executor.describe());
    let selection = executor.execute_offsets(&offsets)?;
    println!(
        "   selected {} rows: {:?}",
        selection.count(),
        selection.as_slice()
    );
    Ok(())
}
