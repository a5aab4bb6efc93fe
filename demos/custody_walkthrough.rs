//! Walks one batch through the whole supply chain and prints the derived
//! progress line after every transition.
//!
//!     cargo run --example custody_walkthrough

use std::sync::Arc;

use pharma_ledger::batch::{BatchId, progress_message};
use pharma_ledger::policy::LedgerPolicy;
use pharma_ledger::registry::{Role, SledRoleDirectory};
use pharma_ledger::service::CustodyService;
use pharma_ledger::utils::new_identity;

fn main() -> anyhow::Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let db = Arc::new(sled::open(temp_dir.path().join("walkthrough.db"))?);

    let supplier = new_identity("supplier_")?;
    let manufacturer = new_identity("mfg_")?;
    let transporter = new_identity("trans_")?;
    let distributor = new_identity("dist_")?;
    let retailer = new_identity("retail_")?;

    let roles = SledRoleDirectory::new(db.clone());
    let service = CustodyService::new(db, roles, LedgerPolicy::admin_only(supplier.clone()));

    service.assign_role(&supplier, &supplier, Role::Supplier)?;
    service.assign_role(&supplier, &manufacturer, Role::Manufacturer)?;
    service.assign_role(&supplier, &transporter, Role::Transporter)?;
    service.assign_role(&supplier, &distributor, Role::Distributor)?;
    service.assign_role(&supplier, &retailer, Role::Retailer)?;

    let id = BatchId::from_number("12");
    println!("batch 12 -> {id}");

    service.create(&supplier, id, "Test Medicine Batch 12", r#"{"quantity":"1000kg"}"#)?;
    report(&service, &id)?;

    service.transporter_pickup(&transporter, id, "Supplier Facility", "Plant", "leg 1")?;
    report(&service, &id)?;

    service.transporter_deliver(&transporter, id, "Plant", "leg 1 done")?;
    report(&service, &id)?;

    service.manufacture(&manufacturer, id, r#"{"drugName":"Paracetamol 500mg"}"#)?;
    report(&service, &id)?;

    service.receive_by_distributor(&distributor, id, "intake")?;
    report(&service, &id)?;

    service.receive_by_retailer(&retailer, id, "on shelf")?;
    report(&service, &id)?;

    service.mark_sold(&retailer, id, "dispensed")?;
    report(&service, &id)?;

    println!("\nhistory ({} entries):", service.history_len(&id)?);
    for index in 0..service.history_len(&id)? {
        let entry = service.history_entry(&id, index)?;
        println!("  {index}: [{}] {} - {}", entry.role, entry.updater, entry.note);
    }

    Ok(())
}

fn report(
    service: &CustodyService<SledRoleDirectory>,
    id: &BatchId,
) -> anyhow::Result<()> {
    let view = service.get_status(id)?;
    println!(
        "stage={} status={} location={:?} :: {}",
        view.stage,
        view.status,
        view.location,
        progress_message(view.stage, view.status),
    );
    Ok(())
}
